//! The abstract syntax tree produced by the parser.
//!
//! Every node carries its own `line`/`column` so later phases can raise
//! diagnostics without re-threading a span. Modeled as a small family of
//! closed sum types (`Stmt`, `Expr`, `Pattern`, `MatchPattern`, `TypeExpr`)
//! rather than one flat enum with a string discriminator tag, so a missing
//! match arm is a compile error in this crate instead of a runtime surprise.

#[derive(Debug, Clone)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub type_ann: Option<TypeExpr>,
    pub default: Option<Expr>,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone)]
pub struct Decorator {
    pub name: String,
    pub args: Vec<Expr>,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    /// `val` / `var` bindings. `mutable` is false for `val`.
    Let {
        name: String,
        pattern: Option<Pattern>,
        mutable: bool,
        /// `immutable val X = ...` — followed by `Object.freeze(X)` in codegen.
        immutable: bool,
        type_ann: Option<TypeExpr>,
        init: Option<Expr>,
        line: usize,
        column: usize,
    },
    Fn {
        name: String,
        params: Vec<Param>,
        return_type: Option<TypeExpr>,
        body: Vec<Stmt>,
        decorators: Vec<Decorator>,
        is_async: bool,
        line: usize,
        column: usize,
    },
    Return {
        value: Option<Expr>,
        line: usize,
        column: usize,
    },
    Expr {
        expr: Expr,
        line: usize,
        column: usize,
    },
    If {
        cond: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Option<Vec<Stmt>>,
        line: usize,
        column: usize,
    },
    /// `ifset name { ... }` — a narrowing conditional over a possibly-null
    /// binding; only truthy when `name` is neither `null` nor `undefined`.
    Ifset {
        name: String,
        bind_as: Option<String>,
        then_branch: Vec<Stmt>,
        else_branch: Option<Vec<Stmt>>,
        line: usize,
        column: usize,
    },
    Unless {
        cond: Expr,
        body: Vec<Stmt>,
        line: usize,
        column: usize,
    },
    Loop {
        body: Vec<Stmt>,
        line: usize,
        column: usize,
    },
    While {
        cond: Expr,
        body: Vec<Stmt>,
        line: usize,
        column: usize,
    },
    ForIn {
        binding: Pattern,
        iterable: Expr,
        body: Vec<Stmt>,
        line: usize,
        column: usize,
    },
    Break {
        line: usize,
        column: usize,
    },
    Continue {
        line: usize,
        column: usize,
    },
    Match {
        subject: Expr,
        arms: Vec<MatchArm>,
        line: usize,
        column: usize,
    },
    Class {
        name: String,
        superclass: Option<String>,
        interfaces: Vec<String>,
        fields: Vec<ClassField>,
        methods: Vec<Stmt>,
        decorators: Vec<Decorator>,
        line: usize,
        column: usize,
    },
    /// `interface`, `trait`, and `type` alias declarations erase entirely in
    /// codegen; kept in the AST so the type inferer can still see them.
    Interface {
        name: String,
        members: Vec<(String, TypeExpr)>,
        line: usize,
        column: usize,
    },
    TypeAlias {
        name: String,
        value: TypeExpr,
        line: usize,
        column: usize,
    },
    /// An algebraic sum type: `type Shape = Circle(f64) | Square(f64)`.
    Enum {
        name: String,
        variants: Vec<EnumVariant>,
        line: usize,
        column: usize,
    },
    /// `declare ...` — ambient declaration, erased in codegen.
    Declare {
        line: usize,
        column: usize,
    },
    Namespace {
        name: String,
        body: Vec<Stmt>,
        line: usize,
        column: usize,
    },
    Import {
        names: Vec<String>,
        default: Option<String>,
        source: String,
        line: usize,
        column: usize,
    },
    /// `require("module")` surfaced as a statement-level import form.
    Require {
        binding: String,
        source: String,
        line: usize,
        column: usize,
    },
    /// `require(ntl, http, fs, ...)` — resolves each name against the closed
    /// set of bundled modules and binds each to a `const` of the same name.
    NTLRequire {
        modules: Vec<String>,
        line: usize,
        column: usize,
    },
    Export {
        decl: Box<Stmt>,
        line: usize,
        column: usize,
    },
    Spawn {
        body: Vec<Stmt>,
        line: usize,
        column: usize,
    },
    Select {
        arms: Vec<SelectArm>,
        line: usize,
        column: usize,
    },
    Try {
        body: Vec<Stmt>,
        catch_name: Option<String>,
        catch_body: Option<Vec<Stmt>>,
        finally_body: Option<Vec<Stmt>>,
        line: usize,
        column: usize,
    },
    Throw {
        value: Expr,
        line: usize,
        column: usize,
    },
    Block {
        body: Vec<Stmt>,
        line: usize,
        column: usize,
    },
}

#[derive(Debug, Clone)]
pub struct ClassField {
    pub name: String,
    pub type_ann: Option<TypeExpr>,
    pub default: Option<Expr>,
    pub mutable: bool,
}

#[derive(Debug, Clone)]
pub struct EnumVariant {
    pub name: String,
    pub fields: Vec<TypeExpr>,
    /// Explicit numeric value for a plain (C-style) variant; `None` means
    /// "one past whatever the previous plain variant resolved to".
    pub value: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct MatchArm {
    pub pattern: MatchPattern,
    pub guard: Option<Expr>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub struct SelectArm {
    pub channel: Expr,
    pub binding: Option<String>,
    pub body: Vec<Stmt>,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone)]
pub enum MatchPattern {
    Wildcard,
    Literal(Expr),
    Binding(String),
    /// `Circle(radius)` — matches an algebraic variant and binds its fields
    /// positionally (`_0`, `_1`, ... in the lowered JS).
    Variant { name: String, bindings: Vec<String> },
    Object { fields: Vec<(String, MatchPattern)> },
    Array { elements: Vec<MatchPattern>, rest: Option<String> },
    Or(Vec<MatchPattern>),
}

#[derive(Debug, Clone)]
pub enum Pattern {
    Name(String),
    Array { elements: Vec<Pattern>, rest: Option<String> },
    Object { fields: Vec<(String, Pattern)>, rest: Option<String> },
}

#[derive(Debug, Clone)]
pub enum TypeExpr {
    Named(String),
    Generic { name: String, args: Vec<TypeExpr> },
    Union(Vec<TypeExpr>),
    Literal(Expr),
    Function { params: Vec<TypeExpr>, ret: Box<TypeExpr> },
    Array(Box<TypeExpr>),
    Object(Vec<(String, TypeExpr)>),
    Optional(Box<TypeExpr>),
}

#[derive(Debug, Clone)]
pub enum Expr {
    Number(f64, usize, usize),
    BigInt(String, usize, usize),
    Str(String, usize, usize),
    Template(Vec<TemplateChunk>, usize, usize),
    Bool(bool, usize, usize),
    Null(usize, usize),
    Undefined(usize, usize),
    Ident(String, usize, usize),
    This(usize, usize),
    Array(Vec<Expr>, usize, usize),
    Object(Vec<(String, Expr)>, usize, usize),
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
        line: usize,
        column: usize,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
        line: usize,
        column: usize,
    },
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
        line: usize,
        column: usize,
    },
    Assign {
        target: Box<Expr>,
        op: AssignOp,
        value: Box<Expr>,
        line: usize,
        column: usize,
    },
    /// `a = b = c` — a chained assignment; flagged as a style warning by the
    /// scope analyzer even though it lowers to valid JS.
    ChainedAssign {
        targets: Vec<Expr>,
        value: Box<Expr>,
        line: usize,
        column: usize,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        line: usize,
        column: usize,
    },
    New {
        callee: Box<Expr>,
        args: Vec<Expr>,
        line: usize,
        column: usize,
    },
    Member {
        object: Box<Expr>,
        property: String,
        optional: bool,
        line: usize,
        column: usize,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
        line: usize,
        column: usize,
    },
    Conditional {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
        line: usize,
        column: usize,
    },
    /// `value |> f |> g` — left-to-right function pipeline, lowered to
    /// nested calls in codegen.
    Pipeline {
        stages: Vec<Expr>,
        line: usize,
        column: usize,
    },
    Lambda {
        params: Vec<Param>,
        body: LambdaBody,
        is_async: bool,
        line: usize,
        column: usize,
    },
    Freeze {
        expr: Box<Expr>,
        line: usize,
        column: usize,
    },
    Await {
        expr: Box<Expr>,
        line: usize,
        column: usize,
    },
    /// `channel()` — creates a FIFO rendezvous queue (spec §5).
    Channel {
        args: Vec<Expr>,
        line: usize,
        column: usize,
    },
    /// Prefix or postfix `++`/`--`.
    Update {
        op: UpdateOp,
        prefix: bool,
        target: Box<Expr>,
        line: usize,
        column: usize,
    },
    Yield {
        value: Option<Box<Expr>>,
        delegate: bool,
        line: usize,
        column: usize,
    },
    Super(usize, usize),
}

#[derive(Debug, Clone)]
pub enum LambdaBody {
    Expr(Box<Expr>),
    Block(Vec<Stmt>),
}

#[derive(Debug, Clone)]
pub enum TemplateChunk {
    Literal(String),
    Expr(Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Pos,
    Not,
    BitNot,
    Typeof,
    Void,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOp {
    Inc,
    Dec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Eq,
    StrictEq,
    NotEq,
    StrictNotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    NullishCoalesce,
    BitOr,
    BitXor,
    BitAnd,
    Shl,
    Shr,
    UShr,
    Instanceof,
    In,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    And,
    Or,
    NullishCoalesce,
    Shl,
    Shr,
}

impl Expr {
    pub fn line_col(&self) -> (usize, usize) {
        match self {
            Expr::Number(_, l, c)
            | Expr::BigInt(_, l, c)
            | Expr::Str(_, l, c)
            | Expr::Template(_, l, c)
            | Expr::Bool(_, l, c)
            | Expr::Null(l, c)
            | Expr::Undefined(l, c)
            | Expr::Ident(_, l, c)
            | Expr::This(l, c)
            | Expr::Super(l, c)
            | Expr::Array(_, l, c)
            | Expr::Object(_, l, c) => (*l, *c),
            Expr::Unary { line, column, .. }
            | Expr::Binary { line, column, .. }
            | Expr::Logical { line, column, .. }
            | Expr::Assign { line, column, .. }
            | Expr::ChainedAssign { line, column, .. }
            | Expr::Call { line, column, .. }
            | Expr::New { line, column, .. }
            | Expr::Member { line, column, .. }
            | Expr::Index { line, column, .. }
            | Expr::Conditional { line, column, .. }
            | Expr::Pipeline { line, column, .. }
            | Expr::Lambda { line, column, .. }
            | Expr::Freeze { line, column, .. }
            | Expr::Await { line, column, .. }
            | Expr::Channel { line, column, .. }
            | Expr::Update { line, column, .. }
            | Expr::Yield { line, column, .. } => (*line, *column),
        }
    }
}
