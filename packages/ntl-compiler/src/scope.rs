//! Two-pass scope analysis: hoist every declaration in a block before
//! visiting expressions, then walk again looking for references to names
//! that were never declared anywhere in the enclosing chain.

use std::collections::HashMap;

use crate::ast::*;
use crate::diagnostics::{find_similar, Candidate, Diagnostic, DiagnosticCode, Phase, SourceFile, LineIndex};
use crate::modules;

const BUILTINS: &[&str] = &[
    "console", "Math", "JSON", "Object", "Array", "String", "Number",
    "Boolean", "Promise", "Map", "Set", "Symbol", "Error", "parseInt", "parseFloat", "isNaN",
];

struct Scope {
    names: HashMap<String, usize>,
    parent: Option<Box<Scope>>,
}

impl Scope {
    fn root() -> Self {
        let mut names = HashMap::new();
        for b in BUILTINS {
            names.insert(b.to_string(), 0);
        }
        Scope { names, parent: None }
    }

    fn child(parent: Scope) -> Self {
        Scope { names: HashMap::new(), parent: Some(Box::new(parent)) }
    }

    fn declare(&mut self, name: &str, line: usize) {
        self.names.insert(name.to_string(), line);
    }

    fn resolve(&self, name: &str) -> bool {
        if self.names.contains_key(name) {
            return true;
        }
        match &self.parent {
            Some(p) => p.resolve(name),
            None => false,
        }
    }

    fn all_candidates(&self) -> Vec<Candidate> {
        let mut out: Vec<Candidate> = self
            .names
            .iter()
            .map(|(name, line)| Candidate { name: name.clone(), declared_line: *line })
            .collect();
        if let Some(p) = &self.parent {
            out.extend(p.all_candidates());
        }
        out
    }

    fn pop(self) -> Scope {
        *self.parent.expect("popped the root scope")
    }
}

pub struct ScopeAnalyzer {
    file: SourceFile,
    index: LineIndex,
    diagnostics: Vec<Diagnostic>,
}

impl ScopeAnalyzer {
    pub fn new(file: SourceFile) -> Self {
        let index = LineIndex::new(&file.content);
        ScopeAnalyzer { file, index, diagnostics: Vec::new() }
    }

    pub fn analyze(mut self, program: &Program) -> Vec<Diagnostic> {
        let mut scope = Scope::root();
        self.hoist(&program.statements, &mut scope);
        self.visit_block(&program.statements, scope);
        self.diagnostics
    }

    fn loc(&self, line: usize, column: usize) -> crate::diagnostics::SourceLocation {
        self.index.location_at(&self.file, line, column)
    }

    fn undeclared(&mut self, name: &str, line: usize, column: usize, scope: &Scope, is_call: bool) {
        let candidates = scope.all_candidates();
        let similar = find_similar(name, &candidates);
        let names: Vec<String> = similar.into_iter().map(|c| c.name.clone()).collect();
        let loc = self.loc(line, column);
        let code = if is_call { DiagnosticCode::UndefFunc } else { DiagnosticCode::UndefVar };
        let mut diag = Diagnostic::error(
            Phase::Scope,
            format!("'{name}' is not declared in this scope"),
            &loc,
        )
        .with_code(code);
        if !names.is_empty() {
            diag = diag.with_similar_names(names);
        }
        if name == "print" || name == "println" {
            diag = diag.with_example("print(\"Hello\")", "console.log(\"Hello\")");
        }
        self.diagnostics.push(diag);
    }

    fn check_ntl_require(&mut self, modules: &[String], line: usize, column: usize) {
        for name in modules {
            if modules::resolve(name).is_none() {
                let candidates: Vec<Candidate> = modules::names()
                    .map(|n| Candidate { name: n.to_string(), declared_line: 0 })
                    .collect();
                let similar: Vec<String> =
                    find_similar(name, &candidates).into_iter().map(|c| c.name.clone()).collect();
                let loc = self.loc(line, column);
                let mut diag = Diagnostic::error(
                    Phase::Resolve,
                    format!("'{name}' is not a bundled module"),
                    &loc,
                )
                .with_code(DiagnosticCode::UnknownModule);
                if !similar.is_empty() {
                    diag = diag.with_similar_names(similar);
                }
                self.diagnostics.push(diag);
            }
        }
    }

    fn hoist(&mut self, stmts: &[Stmt], scope: &mut Scope) {
        for stmt in stmts {
            match stmt {
                Stmt::Let { name, pattern, line, .. } => {
                    if let Some(p) = pattern {
                        self.hoist_pattern(p, scope, *line);
                    } else {
                        scope.declare(name, *line);
                    }
                }
                Stmt::Fn { name, line, .. } => scope.declare(name, *line),
                Stmt::Class { name, line, .. } => scope.declare(name, *line),
                Stmt::Interface { name, line, .. } => scope.declare(name, *line),
                Stmt::TypeAlias { name, line, .. } => scope.declare(name, *line),
                Stmt::Enum { name, variants, line, .. } => {
                    scope.declare(name, *line);
                    for v in variants {
                        scope.declare(&v.name, *line);
                    }
                }
                Stmt::Namespace { name, line, .. } => scope.declare(name, *line),
                Stmt::Import { names, default, line, .. } => {
                    for n in names {
                        scope.declare(n, *line);
                    }
                    if let Some(d) = default {
                        scope.declare(d, *line);
                    }
                }
                Stmt::Require { binding, line, .. } => scope.declare(binding, *line),
                Stmt::NTLRequire { modules, line, .. } => {
                    for m in modules {
                        scope.declare(m, *line);
                    }
                }
                Stmt::Export { decl, .. } => self.hoist(std::slice::from_ref(decl), scope),
                _ => {}
            }
        }
    }

    fn hoist_pattern(&mut self, pattern: &Pattern, scope: &mut Scope, line: usize) {
        match pattern {
            Pattern::Name(n) => scope.declare(n, line),
            Pattern::Array { elements, rest } => {
                for e in elements {
                    self.hoist_pattern(e, scope, line);
                }
                if let Some(r) = rest {
                    scope.declare(r, line);
                }
            }
            Pattern::Object { fields, rest } => {
                for (_, p) in fields {
                    self.hoist_pattern(p, scope, line);
                }
                if let Some(r) = rest {
                    scope.declare(r, line);
                }
            }
        }
    }

    fn visit_block(&mut self, stmts: &[Stmt], mut scope: Scope) -> Scope {
        for stmt in stmts {
            self.visit_stmt(stmt, &mut scope);
        }
        scope
    }

    fn visit_stmt(&mut self, stmt: &Stmt, scope: &mut Scope) {
        match stmt {
            Stmt::Let { init, pattern, .. } => {
                if let Some(e) = init {
                    self.visit_expr(e, scope);
                }
                let _ = pattern;
            }
            Stmt::Fn { params, body, .. } => {
                let mut inner = Scope::child(std::mem::replace(scope, Scope::root()));
                for p in params {
                    inner.declare(&p.name, p.line);
                    if let Some(d) = &p.default {
                        self.visit_expr(d, &mut inner);
                    }
                }
                self.hoist(body, &mut inner);
                let inner = self.visit_block(body, inner);
                *scope = inner.pop();
            }
            Stmt::Return { value, .. } => {
                if let Some(v) = value {
                    self.visit_expr(v, scope);
                }
            }
            Stmt::Expr { expr, .. } => self.visit_expr(expr, scope),
            Stmt::If { cond, then_branch, else_branch, .. } => {
                self.visit_expr(cond, scope);
                self.visit_nested_block(then_branch, scope);
                if let Some(e) = else_branch {
                    self.visit_nested_block(e, scope);
                }
            }
            Stmt::Ifset { name, bind_as, then_branch, else_branch, line, column } => {
                if !scope.resolve(name) {
                    self.undeclared(name, *line, *column, scope, false);
                }
                let mut inner = Scope::child(std::mem::replace(scope, Scope::root()));
                if let Some(alias) = bind_as {
                    inner.declare(alias, *line);
                }
                self.hoist(then_branch, &mut inner);
                let inner = self.visit_block(then_branch, inner);
                *scope = inner.pop();
                if let Some(e) = else_branch {
                    self.visit_nested_block(e, scope);
                }
            }
            Stmt::Unless { cond, body, .. } => {
                self.visit_expr(cond, scope);
                self.visit_nested_block(body, scope);
            }
            Stmt::Loop { body, .. } => self.visit_nested_block(body, scope),
            Stmt::While { cond, body, .. } => {
                self.visit_expr(cond, scope);
                self.visit_nested_block(body, scope);
            }
            Stmt::ForIn { binding, iterable, body, line, .. } => {
                self.visit_expr(iterable, scope);
                let mut inner = Scope::child(std::mem::replace(scope, Scope::root()));
                self.hoist_pattern(binding, &mut inner, *line);
                self.hoist(body, &mut inner);
                let inner = self.visit_block(body, inner);
                *scope = inner.pop();
            }
            Stmt::Match { subject, arms, .. } => {
                self.visit_expr(subject, scope);
                for arm in arms {
                    let mut inner = Scope::child(std::mem::replace(scope, Scope::root()));
                    self.bind_match_pattern(&arm.pattern, &mut inner);
                    if let Some(g) = &arm.guard {
                        self.visit_expr(g, &mut inner);
                    }
                    self.hoist(&arm.body, &mut inner);
                    let inner = self.visit_block(&arm.body, inner);
                    *scope = inner.pop();
                }
            }
            Stmt::Class { fields, methods, .. } => {
                for f in fields {
                    if let Some(d) = &f.default {
                        self.visit_expr(d, scope);
                    }
                }
                for m in methods {
                    self.visit_stmt(m, scope);
                }
            }
            Stmt::Spawn { body, .. } => self.visit_nested_block(body, scope),
            Stmt::Select { arms, .. } => {
                for arm in arms {
                    self.visit_expr(&arm.channel, scope);
                    let mut inner = Scope::child(std::mem::replace(scope, Scope::root()));
                    if let Some(b) = &arm.binding {
                        inner.declare(b, 0);
                    }
                    self.hoist(&arm.body, &mut inner);
                    let inner = self.visit_block(&arm.body, inner);
                    *scope = inner.pop();
                }
            }
            Stmt::Try { body, catch_name, catch_body, finally_body, .. } => {
                self.visit_nested_block(body, scope);
                if let Some(cb) = catch_body {
                    let mut inner = Scope::child(std::mem::replace(scope, Scope::root()));
                    if let Some(n) = catch_name {
                        inner.declare(n, 0);
                    }
                    self.hoist(cb, &mut inner);
                    let inner = self.visit_block(cb, inner);
                    *scope = inner.pop();
                }
                if let Some(fb) = finally_body {
                    self.visit_nested_block(fb, scope);
                }
            }
            Stmt::Throw { value, .. } => self.visit_expr(value, scope),
            Stmt::NTLRequire { modules, line, column } => {
                self.check_ntl_require(modules, *line, *column);
            }
            Stmt::Export { decl, .. } => self.visit_stmt(decl, scope),
            Stmt::Block { body, .. } => self.visit_nested_block(body, scope),
            Stmt::Namespace { body, .. } => self.visit_nested_block(body, scope),
            Stmt::Interface { .. }
            | Stmt::TypeAlias { .. }
            | Stmt::Enum { .. }
            | Stmt::Declare { .. }
            | Stmt::Import { .. }
            | Stmt::Require { .. }
            | Stmt::Break { .. }
            | Stmt::Continue { .. } => {}
        }
    }

    fn visit_nested_block(&mut self, body: &[Stmt], outer: &mut Scope) {
        let mut inner = Scope::child(std::mem::replace(outer, Scope::root()));
        self.hoist(body, &mut inner);
        let inner = self.visit_block(body, inner);
        *outer = inner.pop();
    }

    fn bind_match_pattern(&mut self, pattern: &MatchPattern, scope: &mut Scope) {
        match pattern {
            MatchPattern::Wildcard | MatchPattern::Literal(_) => {}
            MatchPattern::Binding(name) => scope.declare(name, 0),
            MatchPattern::Variant { bindings, .. } => {
                for b in bindings {
                    scope.declare(b, 0);
                }
            }
            MatchPattern::Object { fields } => {
                for (_, p) in fields {
                    self.bind_match_pattern(p, scope);
                }
            }
            MatchPattern::Array { elements, rest } => {
                for e in elements {
                    self.bind_match_pattern(e, scope);
                }
                if let Some(r) = rest {
                    scope.declare(r, 0);
                }
            }
            MatchPattern::Or(options) => {
                for o in options {
                    self.bind_match_pattern(o, scope);
                }
            }
        }
    }

    fn visit_expr(&mut self, expr: &Expr, scope: &mut Scope) {
        match expr {
            Expr::Ident(name, line, column) => {
                if !scope.resolve(name) {
                    self.undeclared(name, *line, *column, scope, false);
                }
            }
            Expr::Array(items, ..) => {
                for i in items {
                    self.visit_expr(i, scope);
                }
            }
            Expr::Object(fields, ..) => {
                for (_, v) in fields {
                    self.visit_expr(v, scope);
                }
            }
            Expr::Template(chunks, ..) => {
                for c in chunks {
                    if let TemplateChunk::Expr(e) = c {
                        self.visit_expr(e, scope);
                    }
                }
            }
            Expr::Unary { expr, .. } | Expr::Freeze { expr, .. } | Expr::Await { expr, .. } => {
                self.visit_expr(expr, scope)
            }
            Expr::Update { target, .. } => self.visit_assign_target(target, scope),
            Expr::Yield { value, .. } => {
                if let Some(v) = value {
                    self.visit_expr(v, scope);
                }
            }
            Expr::Channel { args, .. } => {
                for a in args {
                    self.visit_expr(a, scope);
                }
            }
            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.visit_expr(left, scope);
                self.visit_expr(right, scope);
            }
            Expr::Assign { target, value, .. } => {
                self.visit_assign_target(target, scope);
                self.visit_expr(value, scope);
            }
            Expr::ChainedAssign { targets, value, line, column } => {
                for t in targets {
                    self.visit_assign_target(t, scope);
                }
                self.visit_expr(value, scope);
                let loc = self.loc(*line, *column);
                self.diagnostics.push(
                    Diagnostic::warning(Phase::Scope, "chained assignment is easy to misread", &loc)
                        .with_code(DiagnosticCode::ChainedAssign),
                );
            }
            Expr::Call { callee, args, line, column } => {
                if let Expr::Ident(name, ..) = callee.as_ref() {
                    if !scope.resolve(name) {
                        self.undeclared(name, *line, *column, scope, true);
                    }
                } else {
                    self.visit_expr(callee, scope);
                }
                if args.len() > 6 {
                    let loc = self.loc(*line, *column);
                    self.diagnostics.push(
                        Diagnostic::warning(
                            Phase::Scope,
                            "this call passes more than six arguments; consider an options object",
                            &loc,
                        )
                        .with_code(DiagnosticCode::TooManyParams),
                    );
                }
                for a in args {
                    self.visit_expr(a, scope);
                }
            }
            Expr::New { callee, args, .. } => {
                self.visit_expr(callee, scope);
                for a in args {
                    self.visit_expr(a, scope);
                }
            }
            Expr::Member { object, .. } => self.visit_expr(object, scope),
            Expr::Index { object, index, .. } => {
                self.visit_expr(object, scope);
                self.visit_expr(index, scope);
            }
            Expr::Conditional { cond, then_branch, else_branch, .. } => {
                self.visit_expr(cond, scope);
                self.visit_expr(then_branch, scope);
                self.visit_expr(else_branch, scope);
            }
            Expr::Pipeline { stages, .. } => {
                for s in stages {
                    self.visit_expr(s, scope);
                }
            }
            Expr::Lambda { params, body, .. } => {
                let mut inner = Scope::child(std::mem::replace(scope, Scope::root()));
                for p in params {
                    inner.declare(&p.name, p.line);
                }
                match body {
                    LambdaBody::Expr(e) => self.visit_expr(e, &mut inner),
                    LambdaBody::Block(stmts) => {
                        self.hoist(stmts, &mut inner);
                        inner = self.visit_block(stmts, inner);
                    }
                }
                *scope = inner.pop();
            }
            Expr::Number(..)
            | Expr::BigInt(..)
            | Expr::Str(..)
            | Expr::Bool(..)
            | Expr::Null(..)
            | Expr::Undefined(..)
            | Expr::This(..)
            | Expr::Super(..) => {}
        }
    }

    fn visit_assign_target(&mut self, target: &Expr, scope: &mut Scope) {
        match target {
            Expr::Ident(name, line, column) => {
                if !scope.resolve(name) {
                    self.undeclared(name, *line, *column, scope, false);
                }
            }
            Expr::Member { object, .. } => self.visit_expr(object, scope),
            Expr::Index { object, index, .. } => {
                self.visit_expr(object, scope);
                self.visit_expr(index, scope);
            }
            other => self.visit_expr(other, scope),
        }
    }
}

pub fn analyze(program: &Program, file: SourceFile) -> Vec<Diagnostic> {
    ScopeAnalyzer::new(file).analyze(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse;

    fn diagnostics_for(src: &str) -> Vec<Diagnostic> {
        let file = SourceFile::new(src, "t.ntl");
        let (tokens, _) = tokenize(src, "t.ntl");
        let (program, _) = parse(tokens, file.clone());
        analyze(&program, file)
    }

    #[test]
    fn flags_undeclared_identifier() {
        let diags = diagnostics_for("fn f() { return unknownValue }");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, Some(DiagnosticCode::UndefVar));
    }

    #[test]
    fn accepts_declared_identifier() {
        let diags = diagnostics_for("val x = 1\nconsole.log(x)");
        assert!(diags.is_empty(), "{diags:?}");
    }

    #[test]
    fn suggests_similar_name() {
        let diags = diagnostics_for("val username = \"a\"\nconsole.log(usernam)");
        assert_eq!(diags.len(), 1);
        assert!(diags[0].similar_names.contains(&"username".to_string()));
    }

    #[test]
    fn flags_print_as_undefined_function() {
        let diags = diagnostics_for("print(\"Hello\")");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, Some(DiagnosticCode::UndefFunc));
        assert!(diags[0].example.is_some());
    }

    #[test]
    fn console_log_resolves_without_diagnostics() {
        let diags = diagnostics_for("console.log(1)");
        assert!(diags.is_empty(), "{diags:?}");
    }

    #[test]
    fn flags_unknown_ntl_module() {
        let diags = diagnostics_for("require(ntl, leftpad)");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, Some(DiagnosticCode::UnknownModule));
    }

    #[test]
    fn accepts_bundled_ntl_module() {
        let diags = diagnostics_for("require(ntl, http)\nconsole.log(http)");
        assert!(diags.is_empty(), "{diags:?}");
    }

    #[test]
    fn warns_on_chained_assignment() {
        let diags = diagnostics_for("var a = 0\nvar b = 0\na = b = 1");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, Some(DiagnosticCode::ChainedAssign));
    }
}
