use ntl_compiler::diagnostics::{DiagnosticCode, SourceFile};
use ntl_compiler::lexer::tokenize;
use ntl_compiler::parser::parse;
use ntl_compiler::scope::analyze;

fn diagnostics_for(src: &str) -> Vec<ntl_compiler::Diagnostic> {
    let file = SourceFile::new(src, "t.ntl");
    let (tokens, _) = tokenize(src, "t.ntl");
    let (program, _) = parse(tokens, file.clone());
    analyze(&program, file)
}

#[test]
fn hoists_function_declarations_before_use() {
    let diags = diagnostics_for("console.log(greet())\nfn greet() { return \"hi\" }");
    assert!(diags.is_empty(), "{diags:?}");
}

#[test]
fn flags_reference_inside_nested_block() {
    let diags = diagnostics_for("if true {\n  console.log(missing)\n}");
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, Some(DiagnosticCode::UndefVar));
}

#[test]
fn match_arm_bindings_are_scoped_to_their_arm() {
    let diags = diagnostics_for(
        "match shape {\n  Circle(r) => r,\n  Square(s) => s,\n}\nconsole.log(shape)",
    );
    assert!(diags.iter().any(|d| d.code == Some(DiagnosticCode::UndefVar)));
}
