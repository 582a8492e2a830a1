use ntl_compiler::diagnostics::DiagnosticCode;
use ntl_compiler::lexer::{tokenize, Keyword, TokenKind};

#[test]
fn tokenizes_a_small_program() {
    let (tokens, diags) = tokenize("fn add(a, b) { return a + b }", "t.ntl");
    assert!(diags.is_empty());
    assert!(tokens.iter().any(|t| t.kind == TokenKind::Keyword(Keyword::Fn)));
    assert!(tokens.iter().any(|t| t.kind == TokenKind::Keyword(Keyword::Return)));
}

#[test]
fn unterminated_template_literal_is_reported() {
    let (_, diags) = tokenize("val s = `oops ${1", "t.ntl");
    assert!(diags.iter().any(|d| d.code == Some(DiagnosticCode::LexUnterminated)));
}

#[test]
fn underscore_separated_numbers_parse() {
    let (tokens, diags) = tokenize("1_000_000", "t.ntl");
    assert!(diags.is_empty());
    assert_eq!(tokens[0].kind, TokenKind::Number(1_000_000.0));
}
