use ntl_compiler::codegen::generate;
use ntl_compiler::diagnostics::SourceFile;
use ntl_compiler::lexer::tokenize;
use ntl_compiler::parser::parse;

fn compile(src: &str) -> String {
    let file = SourceFile::new(src, "t.ntl");
    let (tokens, diags) = tokenize(src, "t.ntl");
    assert!(diags.is_empty(), "{diags:?}");
    let (program, diags) = parse(tokens, file);
    assert!(diags.is_empty(), "{diags:?}");
    generate(&program)
}

#[test]
fn lowers_enum_declaration_to_factory_object() {
    let js = compile("type Shape = Circle(number) | Square(number)");
    assert!(js.contains("Circle: (_0) => ({ _tag: \"Circle\", _0 }),"));
}

#[test]
fn interfaces_and_type_aliases_are_erased() {
    let js = compile("interface Greeter { name: string }\nval x = 1");
    assert!(!js.contains("Greeter"));
    assert!(js.contains("const x = 1;"));
}

#[test]
fn template_literal_keeps_js_template_syntax() {
    let js = compile("val name = \"world\"\nconsole.log(`hello ${name}`)");
    assert!(js.contains("`hello ${name}`"));
}

#[test]
fn class_with_superclass_calls_super() {
    let js = compile("class Dog super Animal {\n  fn bark() { return 1 }\n}");
    assert!(js.contains("class Dog extends Animal"));
    assert!(js.contains("super(...args);"));
}
