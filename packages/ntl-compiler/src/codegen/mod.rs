//! Lowers the AST into JavaScript source text.
//!
//! `Emitter` is a line-buffer with an indent counter, the same shape as a
//! classic pretty-printing visitor: every statement writes full lines
//! through `line()`, nested blocks bump `indent` for their duration, and
//! expressions are built up as strings and threaded through rather than
//! written incrementally, so operator precedence can decide parenthesation
//! before anything touches the buffer.

pub mod emitter;

use crate::ast::*;
use emitter::Emitter;

pub struct Codegen {
    out: Emitter,
}

impl Codegen {
    pub fn new() -> Self {
        Codegen { out: Emitter::new() }
    }

    pub fn generate(mut self, program: &Program) -> String {
        for stmt in &program.statements {
            self.stmt(stmt);
        }
        self.out.finish()
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Let { name, pattern, mutable, immutable, init, .. } => {
                let kind = if *mutable { "let" } else { "const" };
                let target = match pattern {
                    Some(p) => pattern_js(p),
                    None => name.clone(),
                };
                match init {
                    Some(e) => self.out.line(&format!("{kind} {target} = {};", self.expr(e))),
                    None => self.out.line(&format!("{kind} {target};")),
                }
                if *immutable {
                    self.out.line(&format!("Object.freeze({name});"));
                }
            }
            Stmt::Fn { name, params, body, decorators, is_async, .. } => {
                let prefix = if *is_async { "async function" } else { "function" };
                self.out.line(&format!("{prefix} {name}({}) {{", param_list_js(params)));
                self.out.indented(|e| {
                    let mut gen = Codegen { out: std::mem::replace(e, Emitter::new()) };
                    for s in body {
                        gen.stmt(s);
                    }
                    *e = gen.out;
                });
                self.out.line("}");
                self.apply_decorators(name, decorators);
            }
            Stmt::Return { value, .. } => match value {
                Some(e) => self.out.line(&format!("return {};", self.expr(e))),
                None => self.out.line("return;"),
            },
            Stmt::Expr { expr, .. } => self.out.line(&format!("{};", self.expr(expr))),
            Stmt::If { cond, then_branch, else_branch, .. } => {
                self.out.line(&format!("if ({}) {{", self.expr(cond)));
                self.block(then_branch);
                match else_branch {
                    Some(e) => {
                        self.out.line("} else {");
                        self.block(e);
                        self.out.line("}");
                    }
                    None => self.out.line("}"),
                }
            }
            Stmt::Ifset { name, bind_as, then_branch, else_branch, .. } => {
                let bound = bind_as.clone().unwrap_or_else(|| name.clone());
                self.out
                    .line(&format!("if ({name} !== null && {name} !== undefined) {{"));
                self.out.indented(|e| {
                    if bind_as.is_some() {
                        e.push_line(&format!("const {bound} = {name};"));
                    }
                });
                self.block(then_branch);
                match else_branch {
                    Some(e) => {
                        self.out.line("} else {");
                        self.block(e);
                        self.out.line("}");
                    }
                    None => self.out.line("}"),
                }
            }
            Stmt::Unless { cond, body, .. } => {
                self.out.line(&format!("if (!({})) {{", self.expr(cond)));
                self.block(body);
                self.out.line("}");
            }
            Stmt::Loop { body, .. } => {
                self.out.line("while (true) {");
                self.block(body);
                self.out.line("}");
            }
            Stmt::While { cond, body, .. } => {
                self.out.line(&format!("while ({}) {{", self.expr(cond)));
                self.block(body);
                self.out.line("}");
            }
            Stmt::ForIn { binding, iterable, body, .. } => {
                self.out.line(&format!(
                    "for (const {} of {}) {{",
                    pattern_js(binding),
                    self.expr(iterable)
                ));
                self.block(body);
                self.out.line("}");
            }
            Stmt::Break { .. } => self.out.line("break;"),
            Stmt::Continue { .. } => self.out.line("continue;"),
            Stmt::Match { subject, arms, .. } => self.match_stmt(subject, arms),
            Stmt::Class { name, superclass, fields, methods, decorators, .. } => {
                match superclass {
                    Some(sup) => self.out.line(&format!("class {name} extends {sup} {{")),
                    None => self.out.line(&format!("class {name} {{")),
                }
                self.out.indented(|e| {
                    if !fields.is_empty() || superclass.is_some() {
                        e.push_line("constructor(...args) {");
                    }
                });
                if !fields.is_empty() || superclass.is_some() {
                    self.out.indented(|e| {
                        e.indented(|inner| {
                            if superclass.is_some() {
                                inner.push_line("super(...args);");
                            }
                            for f in fields {
                                let default_expr = f
                                    .default
                                    .as_ref()
                                    .map(|d| Codegen::new().expr(d))
                                    .unwrap_or_else(|| "undefined".to_string());
                                inner.push_line(&format!("this.{} = {};", f.name, default_expr));
                            }
                        });
                    });
                    self.out.indented(|e| e.push_line("}"));
                }
                self.out.indented(|e| {
                    let mut gen = Codegen { out: std::mem::replace(e, Emitter::new()) };
                    for m in methods {
                        gen.method(m);
                    }
                    *e = gen.out;
                });
                self.out.line("}");
                self.apply_decorators(name, decorators);
            }
            Stmt::Interface { .. } | Stmt::TypeAlias { .. } | Stmt::Declare { .. } => {}
            Stmt::Enum { name, variants, .. } => self.enum_stmt(name, variants),
            Stmt::Namespace { name, body, .. } => {
                self.out.line(&format!("const {name} = (() => {{"));
                self.out.indented(|e| {
                    let mut gen = Codegen { out: std::mem::replace(e, Emitter::new()) };
                    for s in body {
                        gen.stmt(s);
                    }
                    *e = gen.out;
                });
                self.out.line("})();");
            }
            Stmt::Import { names, default, source, .. } => {
                let mut parts = Vec::new();
                if let Some(d) = default {
                    parts.push(d.clone());
                }
                if !names.is_empty() {
                    parts.push(format!("{{ {} }}", names.join(", ")));
                }
                self.out
                    .line(&format!("import {} from \"{}\";", parts.join(", "), source));
            }
            Stmt::Require { binding, source, .. } => {
                self.out
                    .line(&format!("const {binding} = require(\"{source}\");"));
            }
            Stmt::NTLRequire { modules, .. } => {
                for m in modules {
                    let path = crate::modules::resolve(m).unwrap_or(m);
                    self.out.line(&format!("const {m} = require(\"{path}\");"));
                }
            }
            Stmt::Export { decl, .. } => {
                self.out.push_export_prefix();
                self.stmt(decl);
                self.out.pop_export_prefix();
            }
            Stmt::Spawn { body, .. } => {
                self.out.line("(async () => {");
                self.block(body);
                self.out.line("})();");
            }
            Stmt::Select { arms, .. } => self.select_stmt(arms),
            Stmt::Try { body, catch_name, catch_body, finally_body, .. } => {
                self.out.line("try {");
                self.block(body);
                if let Some(cb) = catch_body {
                    let binding = catch_name.clone().unwrap_or_else(|| "_err".to_string());
                    self.out.line(&format!("}} catch ({binding}) {{"));
                    self.block(cb);
                }
                if let Some(fb) = finally_body {
                    self.out.line("} finally {");
                    self.block(fb);
                }
                self.out.line("}");
            }
            Stmt::Throw { value, .. } => self.out.line(&format!("throw {};", self.expr(value))),
            Stmt::Block { body, .. } => {
                self.out.line("{");
                self.block(body);
                self.out.line("}");
            }
        }
    }

    fn method(&mut self, stmt: &Stmt) {
        if let Stmt::Fn { name, params, body, is_async, .. } = stmt {
            let prefix = if *is_async { "async " } else { "" };
            self.out.line(&format!("{prefix}{name}({}) {{", param_list_js(params)));
            self.out.indented(|e| {
                let mut gen = Codegen { out: std::mem::replace(e, Emitter::new()) };
                for s in body {
                    gen.stmt(s);
                }
                *e = gen.out;
            });
            self.out.line("}");
        } else {
            self.stmt(stmt);
        }
    }

    /// Reapplies `@decorator(args)` annotations, innermost-first, as
    /// `name = decorator(name, args...)` statements after the declaration.
    fn apply_decorators(&mut self, name: &str, decorators: &[Decorator]) {
        for dec in decorators.iter().rev() {
            let mut call_args = vec![name.to_string()];
            call_args.extend(dec.args.iter().map(|a| self.expr(a)));
            self.out
                .line(&format!("{name} = {}({});", dec.name, call_args.join(", ")));
        }
    }

    fn block(&mut self, body: &[Stmt]) {
        self.out.indented(|e| {
            let mut gen = Codegen { out: std::mem::replace(e, Emitter::new()) };
            for s in body {
                gen.stmt(s);
            }
            *e = gen.out;
        });
    }

    fn enum_stmt(&mut self, name: &str, variants: &[EnumVariant]) {
        if variants.iter().all(|v| v.fields.is_empty()) {
            self.plain_enum_stmt(name, variants);
        } else {
            self.algebraic_enum_stmt(name, variants);
        }
    }

    /// `enum Color { Red, Green = 5 }` — a frozen, auto-numbered lookup object.
    fn plain_enum_stmt(&mut self, name: &str, variants: &[EnumVariant]) {
        self.out.line(&format!("const {name} = Object.freeze({{"));
        self.out.indented(|e| {
            let mut next = 0f64;
            for v in variants {
                let value = v.value.unwrap_or(next);
                next = value + 1.0;
                e.push_line(&format!("{}: {},", v.name, format_number(value)));
            }
        });
        self.out.line("});");
    }

    fn algebraic_enum_stmt(&mut self, name: &str, variants: &[EnumVariant]) {
        self.out.line(&format!("const {name} = {{"));
        self.out.indented(|e| {
            for v in variants {
                let params: Vec<String> =
                    (0..v.fields.len()).map(|i| format!("_{i}")).collect();
                let body_fields: Vec<String> = std::iter::once(format!("_tag: \"{}\"", v.name))
                    .chain(params.iter().map(|p| format!("{p}")))
                    .collect();
                e.push_line(&format!(
                    "{}: ({}) => ({{ {} }}),",
                    v.name,
                    params.join(", "),
                    body_fields.join(", ")
                ));
            }
        });
        self.out.line("};");
    }

    fn match_stmt(&mut self, subject: &Expr, arms: &[MatchArm]) {
        let subject_js = self.expr(subject);
        self.out.line(&format!("const _subject = {subject_js};"));
        for (i, arm) in arms.iter().enumerate() {
            let keyword = if i == 0 { "if" } else { "} else if" };
            let (cond, bindings) = match_condition("_subject", &arm.pattern);
            let full_cond = match &arm.guard {
                Some(g) => format!("({cond}) && ({})", self.expr(g)),
                None => cond,
            };
            self.out.line(&format!("{keyword} ({full_cond}) {{"));
            self.out.indented(|e| {
                for (name, access) in &bindings {
                    e.push_line(&format!("const {name} = {access};"));
                }
            });
            self.block(&arm.body);
        }
        if !arms.is_empty() {
            self.out.line("}");
        }
    }

    /// `select { case v = ch.receive() => { ... } }` races every arm's
    /// channel receive with `Promise.race` and dispatches on whichever wins.
    fn select_stmt(&mut self, arms: &[SelectArm]) {
        self.out.line("await (async () => {");
        self.out.indented(|e| {
            e.push_line("const [_case, _value] = await Promise.race([");
            e.indented(|inner| {
                for (i, arm) in arms.iter().enumerate() {
                    let channel_js = expr_js(&arm.channel, 10);
                    inner.push_line(&format!(
                        "{channel_js}.receive().then((v) => [{i}, v]),"
                    ));
                }
            });
            e.push_line("]);");
        });
        self.out.indented(|e| {
            for (i, arm) in arms.iter().enumerate() {
                let keyword = if i == 0 { "if" } else { "} else if" };
                e.push_line(&format!("{keyword} (_case === {i}) {{"));
                e.indented(|inner| {
                    if let Some(b) = &arm.binding {
                        inner.push_line(&format!("const {b} = _value;"));
                    }
                    let mut gen = Codegen { out: std::mem::replace(inner, Emitter::new()) };
                    for s in &arm.body {
                        gen.stmt(s);
                    }
                    *inner = gen.out;
                });
            }
            if !arms.is_empty() {
                e.push_line("}");
            }
        });
        self.out.line("})();");
    }

    fn expr(&self, expr: &Expr) -> String {
        expr_js(expr, 0)
    }
}

fn param_list_js(params: &[Param]) -> String {
    params
        .iter()
        .map(|p| match &p.default {
            Some(d) => format!("{} = {}", p.name, expr_js(d, 0)),
            None => p.name.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn pattern_js(pattern: &Pattern) -> String {
    match pattern {
        Pattern::Name(n) => n.clone(),
        Pattern::Array { elements, rest } => {
            let mut parts: Vec<String> = elements.iter().map(pattern_js).collect();
            if let Some(r) = rest {
                parts.push(format!("...{r}"));
            }
            format!("[{}]", parts.join(", "))
        }
        Pattern::Object { fields, rest } => {
            let mut parts: Vec<String> = fields
                .iter()
                .map(|(k, p)| match p {
                    Pattern::Name(n) if n == k => k.clone(),
                    other => format!("{k}: {}", pattern_js(other)),
                })
                .collect();
            if let Some(r) = rest {
                parts.push(format!("...{r}"));
            }
            format!("{{ {} }}", parts.join(", "))
        }
    }
}

/// Precedence of each binary/logical operator, used to decide when a nested
/// expression needs parentheses to preserve its original grouping.
fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Conditional { .. } | Expr::Yield { .. } => 1,
        Expr::Logical { op: LogicalOp::Or, .. } => 2,
        Expr::Logical { op: LogicalOp::And, .. } => 3,
        Expr::Binary { op: BinaryOp::NullishCoalesce, .. } => 2,
        Expr::Binary { op: BinaryOp::BitOr, .. } => 4,
        Expr::Binary { op: BinaryOp::BitXor, .. } => 5,
        Expr::Binary { op: BinaryOp::BitAnd, .. } => 6,
        Expr::Binary {
            op: BinaryOp::Eq | BinaryOp::StrictEq | BinaryOp::NotEq | BinaryOp::StrictNotEq,
            ..
        } => 7,
        Expr::Binary {
            op: BinaryOp::Lt
                | BinaryOp::LtEq
                | BinaryOp::Gt
                | BinaryOp::GtEq
                | BinaryOp::Instanceof
                | BinaryOp::In,
            ..
        } => 8,
        Expr::Binary { op: BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr, .. } => 9,
        Expr::Binary { op: BinaryOp::Add | BinaryOp::Sub, .. } => 10,
        Expr::Binary { op: BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod, .. } => 11,
        Expr::Binary { op: BinaryOp::Pow, .. } => 12,
        Expr::Unary { .. } | Expr::Await { .. } | Expr::Freeze { .. } | Expr::Update { .. } => 13,
        Expr::Assign { .. } | Expr::ChainedAssign { .. } => 0,
        _ => 14,
    }
}

fn expr_js(expr: &Expr, parent_prec: u8) -> String {
    let prec = precedence(expr);
    let needs_parens = prec != 0 && prec < parent_prec;
    let rendered = expr_js_inner(expr, prec);
    if needs_parens {
        format!("({rendered})")
    } else {
        rendered
    }
}

fn expr_js_inner(expr: &Expr, prec: u8) -> String {
    match expr {
        Expr::Number(n, ..) => format_number(*n),
        Expr::BigInt(s, ..) => format!("{s}n"),
        Expr::Str(s, ..) => format!("{:?}", s),
        Expr::Template(chunks, ..) => {
            let mut out = String::from("`");
            for c in chunks {
                match c {
                    TemplateChunk::Literal(s) => out.push_str(&s.replace('`', "\\`")),
                    TemplateChunk::Expr(e) => out.push_str(&format!("${{{}}}", expr_js(e, 0))),
                }
            }
            out.push('`');
            out
        }
        Expr::Bool(b, ..) => b.to_string(),
        Expr::Null(..) => "null".to_string(),
        Expr::Undefined(..) => "undefined".to_string(),
        Expr::Ident(name, ..) => name.clone(),
        Expr::This(..) => "this".to_string(),
        Expr::Super(..) => "super".to_string(),
        Expr::Array(items, ..) => {
            let parts: Vec<String> = items.iter().map(|i| expr_js(i, 0)).collect();
            format!("[{}]", parts.join(", "))
        }
        Expr::Object(fields, ..) => {
            let parts: Vec<String> = fields
                .iter()
                .map(|(k, v)| format!("{}: {}", object_key(k), expr_js(v, 0)))
                .collect();
            format!("{{ {} }}", parts.join(", "))
        }
        Expr::Unary { op, expr, .. } => {
            let inner = expr_js(expr, prec);
            match op {
                UnaryOp::Neg => format!("-{inner}"),
                UnaryOp::Pos => format!("+{inner}"),
                UnaryOp::Not => format!("!{inner}"),
                UnaryOp::BitNot => format!("~{inner}"),
                UnaryOp::Typeof => format!("typeof {inner}"),
                UnaryOp::Void => format!("void {inner}"),
                UnaryOp::Delete => format!("delete {inner}"),
            }
        }
        Expr::Update { op, prefix, target, .. } => {
            let sym = match op {
                UpdateOp::Inc => "++",
                UpdateOp::Dec => "--",
            };
            let target_js = expr_js(target, prec);
            if *prefix {
                format!("{sym}{target_js}")
            } else {
                format!("{target_js}{sym}")
            }
        }
        Expr::Yield { value, delegate, .. } => {
            let star = if *delegate { "*" } else { "" };
            match value {
                Some(v) => format!("yield{star} {}", expr_js(v, prec)),
                None => format!("yield{star}"),
            }
        }
        Expr::Channel { .. } => channel_js(),
        Expr::Binary { op, left, right, .. } => {
            let js_op = binary_op_js(*op);
            format!("{} {} {}", expr_js(left, prec), js_op, expr_js(right, prec + 1))
        }
        Expr::Logical { op, left, right, .. } => {
            let js_op = match op {
                LogicalOp::And => "&&",
                LogicalOp::Or => "||",
            };
            format!("{} {} {}", expr_js(left, prec), js_op, expr_js(right, prec + 1))
        }
        Expr::Assign { target, op, value, .. } => {
            let js_op = match op {
                AssignOp::Assign => "=",
                AssignOp::Add => "+=",
                AssignOp::Sub => "-=",
                AssignOp::Mul => "*=",
                AssignOp::Div => "/=",
                AssignOp::Mod => "%=",
                AssignOp::Pow => "**=",
                AssignOp::And => "&&=",
                AssignOp::Or => "||=",
                AssignOp::NullishCoalesce => "??=",
                AssignOp::Shl => "<<=",
                AssignOp::Shr => ">>=",
            };
            format!("{} {} {}", expr_js(target, 0), js_op, expr_js(value, 0))
        }
        Expr::ChainedAssign { targets, value, .. } => {
            let mut parts: Vec<String> = targets.iter().map(|t| expr_js(t, 0)).collect();
            parts.push(expr_js(value, 0));
            parts.join(" = ")
        }
        Expr::Call { callee, args, .. } => {
            let args_js: Vec<String> = args.iter().map(|a| expr_js(a, 0)).collect();
            format!("{}({})", expr_js(callee, 10), args_js.join(", "))
        }
        Expr::New { callee, args, .. } => {
            let args_js: Vec<String> = args.iter().map(|a| expr_js(a, 0)).collect();
            format!("new {}({})", expr_js(callee, 10), args_js.join(", "))
        }
        Expr::Member { object, property, optional, .. } => {
            let op = if *optional { "?." } else { "." };
            format!("{}{op}{property}", expr_js(object, 10))
        }
        Expr::Index { object, index, .. } => {
            format!("{}[{}]", expr_js(object, 10), expr_js(index, 0))
        }
        Expr::Conditional { cond, then_branch, else_branch, .. } => format!(
            "{} ? {} : {}",
            expr_js(cond, prec + 1),
            expr_js(then_branch, 0),
            expr_js(else_branch, 0)
        ),
        Expr::Pipeline { stages, .. } => {
            let mut iter = stages.iter();
            let Some(first) = iter.next() else { return "undefined".to_string() };
            let mut acc = expr_js(first, 0);
            for stage in iter {
                acc = format!("{}({acc})", expr_js(stage, 10));
            }
            acc
        }
        Expr::Lambda { params, body, is_async, .. } => {
            let param_js: Vec<String> = params.iter().map(|p| p.name.clone()).collect();
            let prefix = if *is_async { "async " } else { "" };
            match body {
                LambdaBody::Expr(e) => {
                    format!("{prefix}({}) => {}", param_js.join(", "), expr_js(e, 0))
                }
                LambdaBody::Block(stmts) => {
                    let mut inner = Codegen::new();
                    for s in stmts {
                        inner.stmt(s);
                    }
                    format!("{prefix}({}) => {{\n{}}}", param_js.join(", "), inner.out.finish())
                }
            }
        }
        Expr::Freeze { expr, .. } => format!("Object.freeze({})", expr_js(expr, 0)),
        Expr::Await { expr, .. } => format!("await {}", expr_js(expr, prec)),
    }
}

/// `channel()` lowers to an inline FIFO rendezvous object: a pending
/// `_queue` of unreceived values and a `_listeners` list of receivers
/// waiting on a value that hasn't arrived yet.
fn channel_js() -> String {
    let mut out = Emitter::new();
    out.line("(() => {");
    out.indented(|e| {
        e.push_line("const _queue = [];");
        e.push_line("const _listeners = [];");
        e.push_line("return {");
        e.indented(|inner| {
            inner.push_line("send(value) {");
            inner.indented(|b| {
                b.push_line("if (_listeners.length > 0) {");
                b.indented(|c| c.push_line("_listeners.shift()(value);"));
                b.push_line("} else {");
                b.indented(|c| c.push_line("_queue.push(value);"));
                b.push_line("}");
            });
            inner.push_line("},");
            inner.push_line("receive() {");
            inner.indented(|b| {
                b.push_line("if (_queue.length > 0) {");
                b.indented(|c| c.push_line("return Promise.resolve(_queue.shift());"));
                b.push_line("}");
                b.push_line("return new Promise((resolve) => _listeners.push(resolve));");
            });
            inner.push_line("},");
        });
        e.push_line("};");
    });
    out.line("})()");
    out.finish().trim_end().to_string()
}

fn object_key(key: &str) -> String {
    let valid_ident = key
        .chars()
        .enumerate()
        .all(|(i, c)| if i == 0 { c.is_alphabetic() || c == '_' || c == '$' } else { c.is_alphanumeric() || c == '_' || c == '$' });
    if valid_ident && !key.is_empty() {
        key.to_string()
    } else {
        format!("{:?}", key)
    }
}

fn binary_op_js(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Mod => "%",
        BinaryOp::Pow => "**",
        BinaryOp::Eq => "==",
        BinaryOp::StrictEq => "===",
        BinaryOp::NotEq => "!=",
        BinaryOp::StrictNotEq => "!==",
        BinaryOp::Lt => "<",
        BinaryOp::LtEq => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::GtEq => ">=",
        BinaryOp::NullishCoalesce => "??",
        BinaryOp::BitOr => "|",
        BinaryOp::BitXor => "^",
        BinaryOp::BitAnd => "&",
        BinaryOp::Shl => "<<",
        BinaryOp::Shr => ">>",
        BinaryOp::UShr => ">>>",
        BinaryOp::Instanceof => "instanceof",
        BinaryOp::In => "in",
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Build the condition expression and field-bindings for one match arm.
fn match_condition(subject: &str, pattern: &MatchPattern) -> (String, Vec<(String, String)>) {
    match pattern {
        MatchPattern::Wildcard => ("true".to_string(), Vec::new()),
        MatchPattern::Binding(name) => ("true".to_string(), vec![(name.clone(), subject.to_string())]),
        MatchPattern::Literal(expr) => (format!("{subject} === {}", expr_js(expr, 0)), Vec::new()),
        MatchPattern::Variant { name, bindings } => {
            let cond = format!("{subject}._tag === \"{name}\"");
            let binds = bindings
                .iter()
                .enumerate()
                .map(|(i, b)| (b.clone(), format!("{subject}._{i}")))
                .collect();
            (cond, binds)
        }
        MatchPattern::Object { fields } => {
            let mut conds = Vec::new();
            let mut binds = Vec::new();
            for (key, sub_pattern) in fields {
                let access = format!("{subject}.{key}");
                let (sub_cond, sub_binds) = match_condition(&access, sub_pattern);
                if sub_cond != "true" {
                    conds.push(sub_cond);
                }
                binds.extend(sub_binds);
            }
            let cond = if conds.is_empty() { "true".to_string() } else { conds.join(" && ") };
            (cond, binds)
        }
        MatchPattern::Array { elements, rest } => {
            let mut conds = vec![format!("Array.isArray({subject})")];
            if rest.is_none() {
                conds.push(format!("{subject}.length === {}", elements.len()));
            } else {
                conds.push(format!("{subject}.length >= {}", elements.len()));
            }
            let mut binds = Vec::new();
            for (i, el) in elements.iter().enumerate() {
                let access = format!("{subject}[{i}]");
                let (sub_cond, sub_binds) = match_condition(&access, el);
                if sub_cond != "true" {
                    conds.push(sub_cond);
                }
                binds.extend(sub_binds);
            }
            if let Some(r) = rest {
                binds.push((r.clone(), format!("{subject}.slice({})", elements.len())));
            }
            (conds.join(" && "), binds)
        }
        MatchPattern::Or(options) => {
            let mut conds = Vec::new();
            let mut binds = Vec::new();
            for o in options {
                let (c, b) = match_condition(subject, o);
                conds.push(format!("({c})"));
                binds.extend(b);
            }
            (conds.join(" || "), binds)
        }
    }
}

pub fn generate(program: &Program) -> String {
    Codegen::new().generate(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::SourceFile;
    use crate::lexer::tokenize;
    use crate::parser::parse;

    fn compile(src: &str) -> String {
        let file = SourceFile::new(src, "t.ntl");
        let (tokens, _) = tokenize(src, "t.ntl");
        let (program, diags) = parse(tokens, file);
        assert!(diags.is_empty(), "{diags:?}");
        generate(&program)
    }

    #[test]
    fn emits_val_as_const() {
        let js = compile("val x = 1");
        assert!(js.contains("const x = 1;"));
    }

    #[test]
    fn emits_var_as_let() {
        let js = compile("var x = 1");
        assert!(js.contains("let x = 1;"));
    }

    #[test]
    fn lowers_match_to_if_cascade() {
        let js = compile("match shape {\n  Circle(r) => r,\n  _ => 0,\n}");
        assert!(js.contains("_subject._tag === \"Circle\""));
        assert!(js.contains("const r = _subject._0;"));
    }

    #[test]
    fn lowers_freeze_to_object_freeze() {
        let js = compile("val x = freeze [1, 2]");
        assert!(js.contains("Object.freeze([1, 2])"));
    }

    #[test]
    fn lowers_pipeline_to_nested_calls() {
        let js = compile("val y = x |> double |> inc");
        assert!(js.contains("inc(double(x))"));
    }

    #[test]
    fn preserves_precedence_with_parens() {
        let js = compile("val x = (1 + 2) * 3");
        assert!(js.contains("(1 + 2) * 3"));
    }

    #[test]
    fn lowers_immutable_to_declaration_then_freeze() {
        let js = compile("immutable val c = { a: 1 }");
        assert!(js.contains("const c = { a: 1 };"));
        assert!(js.contains("Object.freeze(c);"));
    }

    #[test]
    fn reapplies_decorators_in_reverse_order() {
        let js = compile("@logged\n@cached(5)\nfn greet() {\n  return 1\n}");
        assert!(js.contains("greet = cached(greet, 5);"));
        assert!(js.contains("greet = logged(greet);"));
        assert!(js.find("cached").unwrap() < js.find("logged").unwrap());
    }

    #[test]
    fn lowers_plain_enum_to_frozen_object() {
        let js = compile("enum Color { Red, Green, Blue = 5 }");
        assert!(js.contains("const Color = Object.freeze({"));
        assert!(js.contains("Red: 0,"));
        assert!(js.contains("Green: 1,"));
        assert!(js.contains("Blue: 5,"));
    }

    #[test]
    fn lowers_algebraic_enum_to_variant_constructors() {
        let js = compile("type Shape = Circle(f64) | Square(f64)");
        assert!(js.contains("Circle: (_0) => ({ _tag: \"Circle\", _0 }),"));
    }

    #[test]
    fn lowers_channel_to_queue_listener_object() {
        let js = compile("val ch = channel()");
        assert!(js.contains("const _queue = []"));
        assert!(js.contains("const _listeners = []"));
        assert!(js.contains("send(value)"));
        assert!(js.contains("receive()"));
    }

    #[test]
    fn lowers_select_to_promise_race() {
        let js = compile("val ch = channel()\nselect {\n  case v = ch.receive() => {\n    console.log(v)\n  }\n}");
        assert!(js.contains("await Promise.race(["));
        assert!(js.contains("ch.receive().then((v) => [0, v]),"));
        assert!(js.contains("if (_case === 0) {"));
        assert!(js.contains("const v = _value;"));
    }

    #[test]
    fn resolves_bundled_ntl_require() {
        let js = compile("require(ntl, http)");
        assert!(js.contains("const http = require(\"ntl/lib/http\");"));
    }

    #[test]
    fn lowers_async_fn_and_await() {
        let js = compile("async fn fetchIt() {\n  val r = await get()\n  return r\n}");
        assert!(js.contains("async function fetchIt() {"));
        assert!(js.contains("await get()"));
    }

    #[test]
    fn lowers_update_and_bitwise_operators() {
        let js = compile("var i = 0\ni++\nval x = 1 << 2\nval y = 5 & 3");
        assert!(js.contains("i++;"));
        assert!(js.contains("1 << 2"));
        assert!(js.contains("5 & 3"));
    }
}
