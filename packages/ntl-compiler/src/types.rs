//! Structural type inference over the AST.
//!
//! Types are a small closed tag set (`Type`) rather than a full unifier —
//! inference is one forward pass per statement, reusing the declared
//! annotation when present and falling back to the literal shape of the
//! initializer otherwise. Mismatches are warnings outside strict mode and
//! errors inside it.

use std::collections::HashMap;

use crate::ast::*;
use crate::diagnostics::{Diagnostic, DiagnosticCode, LineIndex, Phase, SourceFile, SourceLocation};

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Number,
    String,
    Boolean,
    Null,
    Undefined,
    Array(Box<Type>),
    Object(Vec<(String, Type)>),
    Function { params: Vec<Type>, ret: Box<Type> },
    Class(String),
    Union(Vec<Type>),
    Any,
}

impl Type {
    fn from_ann(ann: &TypeExpr, env: &TypeEnv) -> Type {
        match ann {
            TypeExpr::Named(name) => match name.as_str() {
                "number" => Type::Number,
                "string" => Type::String,
                "bool" | "boolean" => Type::Boolean,
                "null" => Type::Null,
                "undefined" | "void" => Type::Undefined,
                "any" => Type::Any,
                other => env.classes.get(other).cloned().unwrap_or(Type::Class(other.to_string())),
            },
            TypeExpr::Generic { name, args } if name == "Array" && args.len() == 1 => {
                Type::Array(Box::new(Type::from_ann(&args[0], env)))
            }
            TypeExpr::Generic { name, .. } => Type::Class(name.clone()),
            TypeExpr::Union(members) => {
                Type::Union(members.iter().map(|m| Type::from_ann(m, env)).collect())
            }
            TypeExpr::Literal(expr) => infer_literal_type(expr),
            TypeExpr::Function { params, ret } => Type::Function {
                params: params.iter().map(|p| Type::from_ann(p, env)).collect(),
                ret: Box::new(Type::from_ann(ret, env)),
            },
            TypeExpr::Array(inner) => Type::Array(Box::new(Type::from_ann(inner, env))),
            TypeExpr::Object(fields) => {
                Type::Object(fields.iter().map(|(n, t)| (n.clone(), Type::from_ann(t, env))).collect())
            }
            TypeExpr::Optional(inner) => {
                Type::Union(vec![Type::from_ann(inner, env), Type::Undefined])
            }
        }
    }

    fn assignable_from(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Any, _) | (_, Type::Any) => true,
            (Type::Union(members), other) => members.iter().any(|m| m.assignable_from(other)),
            (target, Type::Union(members)) => members.iter().all(|m| target.assignable_from(m)),
            (Type::Array(a), Type::Array(b)) => a.assignable_from(b),
            (a, b) => a == b,
        }
    }

    fn display(&self) -> String {
        match self {
            Type::Number => "number".into(),
            Type::String => "string".into(),
            Type::Boolean => "boolean".into(),
            Type::Null => "null".into(),
            Type::Undefined => "undefined".into(),
            Type::Array(inner) => format!("[{}]", inner.display()),
            Type::Object(_) => "object".into(),
            Type::Function { .. } => "function".into(),
            Type::Class(name) => name.clone(),
            Type::Union(members) => members.iter().map(|m| m.display()).collect::<Vec<_>>().join(" | "),
            Type::Any => "any".into(),
        }
    }
}

fn infer_literal_type(expr: &Expr) -> Type {
    match expr {
        Expr::Number(..) => Type::Number,
        Expr::Str(..) => Type::String,
        Expr::Bool(..) => Type::Boolean,
        Expr::Null(..) => Type::Null,
        Expr::Undefined(..) => Type::Undefined,
        _ => Type::Any,
    }
}

#[derive(Default)]
struct TypeEnv {
    vars: HashMap<String, Type>,
    classes: HashMap<String, Type>,
}

pub struct TypeInferer {
    file: SourceFile,
    index: LineIndex,
    strict: bool,
    diagnostics: Vec<Diagnostic>,
}

impl TypeInferer {
    pub fn new(file: SourceFile, strict: bool) -> Self {
        let index = LineIndex::new(&file.content);
        TypeInferer { file, index, strict, diagnostics: Vec::new() }
    }

    pub fn infer(mut self, program: &Program) -> Vec<Diagnostic> {
        let mut env = TypeEnv::default();
        self.predeclare_classes(&program.statements, &mut env);
        for stmt in &program.statements {
            self.infer_stmt(stmt, &mut env);
        }
        self.diagnostics
    }

    fn predeclare_classes(&mut self, stmts: &[Stmt], env: &mut TypeEnv) {
        for stmt in stmts {
            if let Stmt::Class { name, .. } = stmt {
                env.classes.insert(name.clone(), Type::Class(name.clone()));
            }
            if let Stmt::Enum { name, variants, .. } = stmt {
                env.classes.insert(name.clone(), Type::Class(name.clone()));
                for v in variants {
                    env.classes.insert(v.name.clone(), Type::Class(name.clone()));
                }
            }
        }
    }

    fn loc(&self, line: usize, column: usize) -> SourceLocation {
        self.index.location_at(&self.file, line, column)
    }

    fn mismatch(&mut self, expected: &Type, found: &Type, line: usize, column: usize) {
        let loc = self.loc(line, column);
        let message = format!(
            "expected type `{}`, found `{}`",
            expected.display(),
            found.display()
        );
        if self.strict {
            self.diagnostics
                .push(Diagnostic::error(Phase::Type, message, &loc).with_code(DiagnosticCode::TypeMismatch));
        } else {
            self.diagnostics.push(
                Diagnostic::warning(Phase::Type, message, &loc).with_code(DiagnosticCode::TypeMismatchWarn),
            );
        }
    }

    fn infer_stmt(&mut self, stmt: &Stmt, env: &mut TypeEnv) {
        match stmt {
            Stmt::Let { name, type_ann, init, line, column, .. } => {
                let inferred = init.as_ref().map(|e| self.infer_expr(e, env));
                let declared = type_ann.as_ref().map(|t| Type::from_ann(t, env));
                let final_ty = match (&declared, &inferred) {
                    (Some(decl), Some(found)) => {
                        if !decl.assignable_from(found) {
                            self.mismatch(decl, found, *line, *column);
                        }
                        decl.clone()
                    }
                    (Some(decl), None) => decl.clone(),
                    (None, Some(found)) => found.clone(),
                    (None, None) => Type::Any,
                };
                env.vars.insert(name.clone(), final_ty);
            }
            Stmt::Fn { name, params, return_type, body, .. } => {
                let param_types: Vec<Type> = params
                    .iter()
                    .map(|p| p.type_ann.as_ref().map(|t| Type::from_ann(t, env)).unwrap_or(Type::Any))
                    .collect();
                let ret_type = return_type
                    .as_ref()
                    .map(|t| Type::from_ann(t, env))
                    .unwrap_or(Type::Any);
                env.vars.insert(
                    name.clone(),
                    Type::Function { params: param_types.clone(), ret: Box::new(ret_type.clone()) },
                );
                for (p, ty) in params.iter().zip(param_types) {
                    env.vars.insert(p.name.clone(), ty);
                }
                let mut seen = std::collections::HashSet::new();
                for p in params {
                    if !seen.insert(&p.name) {
                        let loc = self.loc(p.line, p.column);
                        self.diagnostics.push(
                            Diagnostic::error(
                                Phase::Type,
                                format!("duplicate parameter name '{}'", p.name),
                                &loc,
                            )
                            .with_code(DiagnosticCode::DuplicateParam),
                        );
                    }
                }
                for s in body {
                    self.infer_stmt(s, env);
                }
            }
            Stmt::Return { value, .. } => {
                if let Some(v) = value {
                    self.infer_expr(v, env);
                }
            }
            Stmt::Expr { expr, .. } => {
                self.infer_expr(expr, env);
            }
            Stmt::If { cond, then_branch, else_branch, .. } => {
                self.infer_expr(cond, env);
                for s in then_branch {
                    self.infer_stmt(s, env);
                }
                if let Some(e) = else_branch {
                    for s in e {
                        self.infer_stmt(s, env);
                    }
                }
            }
            Stmt::Ifset { then_branch, else_branch, .. } => {
                for s in then_branch {
                    self.infer_stmt(s, env);
                }
                if let Some(e) = else_branch {
                    for s in e {
                        self.infer_stmt(s, env);
                    }
                }
            }
            Stmt::Unless { cond, body, .. } | Stmt::While { cond, body, .. } => {
                self.infer_expr(cond, env);
                for s in body {
                    self.infer_stmt(s, env);
                }
            }
            Stmt::Loop { body, .. } | Stmt::Spawn { body, .. } | Stmt::Block { body, .. } => {
                for s in body {
                    self.infer_stmt(s, env);
                }
            }
            Stmt::ForIn { iterable, body, .. } => {
                self.infer_expr(iterable, env);
                for s in body {
                    self.infer_stmt(s, env);
                }
            }
            Stmt::Match { subject, arms, .. } => {
                self.infer_expr(subject, env);
                for arm in arms {
                    for s in &arm.body {
                        self.infer_stmt(s, env);
                    }
                }
            }
            Stmt::Class { fields, methods, .. } => {
                for f in fields {
                    if let Some(d) = &f.default {
                        self.infer_expr(d, env);
                    }
                }
                for m in methods {
                    self.infer_stmt(m, env);
                }
            }
            Stmt::Try { body, catch_body, finally_body, .. } => {
                for s in body {
                    self.infer_stmt(s, env);
                }
                if let Some(cb) = catch_body {
                    for s in cb {
                        self.infer_stmt(s, env);
                    }
                }
                if let Some(fb) = finally_body {
                    for s in fb {
                        self.infer_stmt(s, env);
                    }
                }
            }
            Stmt::Throw { value, .. } => {
                self.infer_expr(value, env);
            }
            Stmt::Export { decl, .. } => self.infer_stmt(decl, env),
            Stmt::Namespace { body, .. } => {
                for s in body {
                    self.infer_stmt(s, env);
                }
            }
            Stmt::Select { arms, .. } => {
                for arm in arms {
                    self.infer_expr(&arm.channel, env);
                    for s in &arm.body {
                        self.infer_stmt(s, env);
                    }
                }
            }
            Stmt::NTLRequire { modules, .. } => {
                for m in modules {
                    env.vars.insert(m.clone(), Type::Any);
                }
            }
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

    fn infer_expr(&mut self, expr: &Expr, env: &mut TypeEnv) -> Type {
        match expr {
            Expr::Number(..) => Type::Number,
            Expr::BigInt(..) => Type::Class("bigint".to_string()),
            Expr::Str(..) => Type::String,
            Expr::Bool(..) => Type::Boolean,
            Expr::Null(..) => Type::Null,
            Expr::Undefined(..) => Type::Undefined,
            Expr::This(..) | Expr::Super(..) => Type::Any,
            Expr::Ident(name, ..) => env.vars.get(name).cloned().unwrap_or(Type::Any),
            Expr::Template(chunks, ..) => {
                for c in chunks {
                    if let TemplateChunk::Expr(e) = c {
                        self.infer_expr(e, env);
                    }
                }
                Type::String
            }
            Expr::Array(items, ..) => {
                let element = items
                    .first()
                    .map(|i| self.infer_expr(i, env))
                    .unwrap_or(Type::Any);
                for i in items.iter().skip(1) {
                    self.infer_expr(i, env);
                }
                Type::Array(Box::new(element))
            }
            Expr::Object(fields, ..) => {
                let mut shape = Vec::new();
                for (k, v) in fields {
                    shape.push((k.clone(), self.infer_expr(v, env)));
                }
                Type::Object(shape)
            }
            Expr::Unary { op, expr, .. } => {
                let ty = self.infer_expr(expr, env);
                match op {
                    UnaryOp::Neg | UnaryOp::Pos | UnaryOp::BitNot => ty,
                    UnaryOp::Not => Type::Boolean,
                    UnaryOp::Typeof => Type::String,
                    UnaryOp::Void => Type::Undefined,
                    UnaryOp::Delete => Type::Boolean,
                }
            }
            Expr::Binary { op, left, right, line, column } => {
                let lt = self.infer_expr(left, env);
                let rt = self.infer_expr(right, env);
                if matches!(op, BinaryOp::Div) {
                    if let Expr::Number(n, ..) = right.as_ref() {
                        if *n == 0.0 {
                            let loc = self.loc(*line, *column);
                            self.diagnostics.push(
                                Diagnostic::warning(Phase::Type, "division by zero", &loc)
                                    .with_code(DiagnosticCode::DivByZero),
                            );
                        }
                    }
                }
                match op {
                    BinaryOp::Eq
                    | BinaryOp::StrictEq
                    | BinaryOp::NotEq
                    | BinaryOp::StrictNotEq
                    | BinaryOp::Lt
                    | BinaryOp::LtEq
                    | BinaryOp::Gt
                    | BinaryOp::GtEq => Type::Boolean,
                    BinaryOp::NullishCoalesce => rt,
                    _ => {
                        if lt == Type::String || rt == Type::String {
                            Type::String
                        } else {
                            lt
                        }
                    }
                }
            }
            Expr::Logical { left, right, .. } => {
                self.infer_expr(left, env);
                self.infer_expr(right, env)
            }
            Expr::Assign { target, value, .. } => {
                let ty = self.infer_expr(value, env);
                self.infer_expr(target, env);
                ty
            }
            Expr::ChainedAssign { targets, value, .. } => {
                let ty = self.infer_expr(value, env);
                for t in targets {
                    self.infer_expr(t, env);
                }
                ty
            }
            Expr::Call { callee, args, .. } => {
                let callee_ty = self.infer_expr(callee, env);
                for a in args {
                    self.infer_expr(a, env);
                }
                match callee_ty {
                    Type::Function { ret, .. } => *ret,
                    _ => Type::Any,
                }
            }
            Expr::New { callee, args, .. } => {
                for a in args {
                    self.infer_expr(a, env);
                }
                match callee.as_ref() {
                    Expr::Ident(name, ..) => Type::Class(name.clone()),
                    _ => Type::Any,
                }
            }
            Expr::Member { object, .. } => {
                self.infer_expr(object, env);
                Type::Any
            }
            Expr::Index { object, index, .. } => {
                let obj_ty = self.infer_expr(object, env);
                self.infer_expr(index, env);
                match obj_ty {
                    Type::Array(inner) => *inner,
                    _ => Type::Any,
                }
            }
            Expr::Conditional { cond, then_branch, else_branch, .. } => {
                self.infer_expr(cond, env);
                let t = self.infer_expr(then_branch, env);
                let e = self.infer_expr(else_branch, env);
                if t == e {
                    t
                } else {
                    Type::Union(vec![t, e])
                }
            }
            Expr::Pipeline { stages, .. } => {
                let mut ty = Type::Any;
                for s in stages {
                    ty = self.infer_expr(s, env);
                }
                ty
            }
            Expr::Lambda { params, body, .. } => {
                let param_types: Vec<Type> = params
                    .iter()
                    .map(|p| p.type_ann.as_ref().map(|t| Type::from_ann(t, env)).unwrap_or(Type::Any))
                    .collect();
                for (p, ty) in params.iter().zip(param_types.iter()) {
                    env.vars.insert(p.name.clone(), ty.clone());
                }
                let ret = match body {
                    LambdaBody::Expr(e) => self.infer_expr(e, env),
                    LambdaBody::Block(stmts) => {
                        for s in stmts {
                            self.infer_stmt(s, env);
                        }
                        Type::Any
                    }
                };
                Type::Function { params: param_types, ret: Box::new(ret) }
            }
            Expr::Freeze { expr, .. } => self.infer_expr(expr, env),
            Expr::Await { expr, .. } => self.infer_expr(expr, env),
            Expr::Update { target, .. } => self.infer_expr(target, env),
            Expr::Yield { value, .. } => {
                if let Some(v) = value {
                    self.infer_expr(v, env)
                } else {
                    Type::Undefined
                }
            }
            Expr::Channel { args, .. } => {
                for a in args {
                    self.infer_expr(a, env);
                }
                Type::Class("Channel".to_string())
            }
        }
    }
}

pub fn infer(program: &Program, file: SourceFile, strict: bool) -> Vec<Diagnostic> {
    TypeInferer::new(file, strict).infer(program)
}
