use ntl_compiler::ast::{Expr, Stmt};
use ntl_compiler::diagnostics::SourceFile;
use ntl_compiler::lexer::tokenize;
use ntl_compiler::parser::parse;

fn parse_ok(src: &str) -> ntl_compiler::ast::Program {
    let file = SourceFile::new(src, "t.ntl");
    let (tokens, lex_diags) = tokenize(src, "t.ntl");
    assert!(lex_diags.is_empty(), "{lex_diags:?}");
    let (program, diags) = parse(tokens, file);
    assert!(diags.is_empty(), "{diags:?}");
    program
}

#[test]
fn parses_algebraic_type_declaration() {
    let program = parse_ok("type Shape = Circle(number) | Square(number)");
    match &program.statements[0] {
        Stmt::Enum { variants, .. } => assert_eq!(variants.len(), 2),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn parses_destructured_binding() {
    let program = parse_ok("val [a, b, ...rest] = xs");
    match &program.statements[0] {
        Stmt::Let { pattern: Some(_), .. } => {}
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn parses_ifset_with_alias() {
    let program = parse_ok("ifset user as u { console.log(u) }");
    match &program.statements[0] {
        Stmt::Ifset { bind_as: Some(name), .. } => assert_eq!(name, "u"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn parses_decorated_function() {
    let program = parse_ok("@memoize\nfn fib(n) { return n }");
    match &program.statements[0] {
        Stmt::Fn { decorators, .. } => assert_eq!(decorators[0].name, "memoize"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn parses_conditional_expression() {
    let program = parse_ok("val x = a > b ? a : b");
    match &program.statements[0] {
        Stmt::Let { init: Some(Expr::Conditional { .. }), .. } => {}
        other => panic!("unexpected {other:?}"),
    }
}
