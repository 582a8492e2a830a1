use ntl_compiler::diagnostics::{translate_host_error, Candidate, find_similar};

#[test]
fn translates_property_access_on_undefined() {
    let msg = translate_host_error("TypeError: Cannot read property 'x' of undefined");
    assert!(msg.contains("null or undefined"));
}

#[test]
fn translates_stack_overflow() {
    let msg = translate_host_error("RangeError: Maximum call stack size exceeded");
    assert!(msg.contains("unbounded recursion"));
}

#[test]
fn similar_name_search_ranks_closest_first() {
    let candidates = vec![
        Candidate { name: "counter".to_string(), declared_line: 1 },
        Candidate { name: "count".to_string(), declared_line: 2 },
    ];
    let found = find_similar("coutn", &candidates);
    assert!(!found.is_empty());
}
