use ntl_compiler::diagnostics::{DiagnosticCode, SourceFile};
use ntl_compiler::lexer::tokenize;
use ntl_compiler::parser::parse;
use ntl_compiler::types::infer;

fn diagnostics_for(src: &str, strict: bool) -> Vec<ntl_compiler::Diagnostic> {
    let file = SourceFile::new(src, "t.ntl");
    let (tokens, _) = tokenize(src, "t.ntl");
    let (program, _) = parse(tokens, file.clone());
    infer(&program, file, strict)
}

#[test]
fn mismatched_annotation_warns_outside_strict_mode() {
    let diags = diagnostics_for("val x: string = 1", false);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, Some(DiagnosticCode::TypeMismatchWarn));
}

#[test]
fn mismatched_annotation_errors_in_strict_mode() {
    let diags = diagnostics_for("val x: string = 1", true);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, Some(DiagnosticCode::TypeMismatch));
}

#[test]
fn duplicate_parameter_names_are_rejected() {
    let diags = diagnostics_for("fn f(a, a) { return a }", false);
    assert!(diags.iter().any(|d| d.code == Some(DiagnosticCode::DuplicateParam)));
}

#[test]
fn division_by_a_literal_zero_warns() {
    let diags = diagnostics_for("val x = 1 / 0", false);
    assert!(diags.iter().any(|d| d.code == Some(DiagnosticCode::DivByZero)));
}
