//! Recursive-descent parser: token stream to `ast::Program`.
//!
//! Precedence climbs bottom-up through one method per tier (assignment,
//! pipeline, nullish-coalesce, logical-or, logical-and, equality, relational,
//! additive, multiplicative, power, unary, postfix, primary), the same shape
//! as a hand-written Pratt parser without the table — easier to read a diff
//! against when a new operator is inserted at a single precedence level.

use crate::ast::*;
use crate::diagnostics::{Diagnostic, DiagnosticCode, Phase, SourceFile, LineIndex};
use crate::lexer::{Keyword, TemplatePart, Token, TokenKind};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    file: SourceFile,
    diagnostics: Vec<Diagnostic>,
}

type PResult<T> = Result<T, ()>;

impl Parser {
    pub fn new(tokens: Vec<Token>, file: SourceFile) -> Self {
        Parser { tokens, pos: 0, file, diagnostics: Vec::new() }
    }

    pub fn parse_program(mut self) -> (Program, Vec<Diagnostic>) {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            match self.statement() {
                Ok(stmt) => statements.push(stmt),
                Err(()) => self.synchronize(),
            }
        }
        (Program { statements }, self.diagnostics)
    }

    // ---- token stream helpers ----

    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn peek_at(&self, n: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + n).map(|t| &t.kind)
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek(), TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if !self.is_at_end() {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(kind)
    }

    fn matches(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind, what: &str) -> PResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            self.error_here(
                format!("expected {what}, found {:?}", self.peek()),
                DiagnosticCode::ParseMissingToken,
            );
            Err(())
        }
    }

    fn expect_keyword(&mut self, kw: Keyword, what: &str) -> PResult<Token> {
        self.expect(&TokenKind::Keyword(kw), what)
    }

    fn check_keyword(&self, kw: Keyword) -> bool {
        matches!(self.peek(), TokenKind::Keyword(k) if *k == kw)
    }

    fn matches_keyword(&mut self, kw: Keyword) -> bool {
        if self.check_keyword(kw) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn error_here(&mut self, message: impl Into<String>, code: DiagnosticCode) {
        let tok = self.current();
        let loc = LineIndex::new(&self.file.content).location(&self.file, tok.offset);
        self.diagnostics
            .push(Diagnostic::error(Phase::Parse, message, &loc).with_code(code));
    }

    fn synchronize(&mut self) {
        self.advance();
        while !self.is_at_end() {
            if matches!(self.peek(), TokenKind::Semicolon) {
                self.advance();
                return;
            }
            if matches!(
                self.peek(),
                TokenKind::Keyword(Keyword::Val)
                    | TokenKind::Keyword(Keyword::Var)
                    | TokenKind::Keyword(Keyword::Fn)
                    | TokenKind::Keyword(Keyword::If)
                    | TokenKind::Keyword(Keyword::Return)
                    | TokenKind::RBrace
            ) {
                return;
            }
            self.advance();
        }
    }

    fn ident_name(&mut self) -> PResult<(String, usize, usize)> {
        let tok = self.current().clone();
        if let TokenKind::Identifier(name) = tok.kind {
            self.advance();
            Ok((name, tok.line, tok.column))
        } else {
            self.error_here("expected identifier", DiagnosticCode::ParseUnexpectedToken);
            Err(())
        }
    }

    fn block(&mut self) -> PResult<Vec<Stmt>> {
        self.expect(&TokenKind::LBrace, "'{'")?;
        let mut body = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            body.push(self.statement()?);
        }
        self.expect(&TokenKind::RBrace, "'}'")?;
        Ok(body)
    }

    // ---- statements ----

    fn statement(&mut self) -> PResult<Stmt> {
        let tok = self.current().clone();
        match &tok.kind {
            TokenKind::Keyword(Keyword::Val)
            | TokenKind::Keyword(Keyword::Var)
            | TokenKind::Keyword(Keyword::Immutable) => self.let_stmt(),
            TokenKind::Keyword(Keyword::Fn) => self.fn_stmt(Vec::new()),
            TokenKind::Keyword(Keyword::Async) if self.is_async_fn_ahead() => self.fn_stmt(Vec::new()),
            TokenKind::At => {
                let decorators = self.decorators()?;
                if self.check_keyword(Keyword::Fn) || self.is_async_fn_ahead() {
                    self.fn_stmt(decorators)
                } else {
                    self.class_stmt(decorators)
                }
            }
            TokenKind::Keyword(Keyword::Class) => self.class_stmt(Vec::new()),
            TokenKind::Keyword(Keyword::Return) => {
                self.advance();
                let value = if self.check(&TokenKind::Semicolon) || self.check(&TokenKind::RBrace) {
                    None
                } else {
                    Some(self.expression()?)
                };
                self.consume_terminator();
                Ok(Stmt::Return { value, line: tok.line, column: tok.column })
            }
            TokenKind::Keyword(Keyword::If) => self.if_stmt(),
            TokenKind::Keyword(Keyword::Ifset) => self.ifset_stmt(),
            TokenKind::Keyword(Keyword::Unless) => {
                self.advance();
                let cond = self.expression()?;
                let body = self.block()?;
                Ok(Stmt::Unless { cond, body, line: tok.line, column: tok.column })
            }
            TokenKind::Keyword(Keyword::Loop) => {
                self.advance();
                let body = self.block()?;
                Ok(Stmt::Loop { body, line: tok.line, column: tok.column })
            }
            TokenKind::Keyword(Keyword::While) => {
                self.advance();
                let cond = self.expression()?;
                let body = self.block()?;
                Ok(Stmt::While { cond, body, line: tok.line, column: tok.column })
            }
            TokenKind::Keyword(Keyword::For) => self.for_in_stmt(),
            TokenKind::Keyword(Keyword::Break) => {
                self.advance();
                self.consume_terminator();
                Ok(Stmt::Break { line: tok.line, column: tok.column })
            }
            TokenKind::Keyword(Keyword::Continue) => {
                self.advance();
                self.consume_terminator();
                Ok(Stmt::Continue { line: tok.line, column: tok.column })
            }
            TokenKind::Keyword(Keyword::Match) => self.match_stmt(),
            TokenKind::Keyword(Keyword::Interface) | TokenKind::Keyword(Keyword::Trait) => {
                self.interface_stmt()
            }
            TokenKind::Keyword(Keyword::Type) => self.type_stmt(),
            TokenKind::Keyword(Keyword::Enum) => self.enum_stmt(),
            TokenKind::Keyword(Keyword::Declare) => {
                self.advance();
                // Ambient declarations are erased; still parse and drop the
                // following statement so control flow stays in sync.
                let _ = self.statement()?;
                Ok(Stmt::Declare { line: tok.line, column: tok.column })
            }
            TokenKind::Keyword(Keyword::Namespace) => {
                self.advance();
                let (name, _, _) = self.ident_name()?;
                let body = self.block()?;
                Ok(Stmt::Namespace { name, body, line: tok.line, column: tok.column })
            }
            TokenKind::Keyword(Keyword::Import) => self.import_stmt(),
            TokenKind::Keyword(Keyword::Export) => {
                self.advance();
                let decl = self.statement()?;
                Ok(Stmt::Export { decl: Box::new(decl), line: tok.line, column: tok.column })
            }
            TokenKind::Keyword(Keyword::Spawn) => {
                self.advance();
                let body = self.block()?;
                Ok(Stmt::Spawn { body, line: tok.line, column: tok.column })
            }
            TokenKind::Keyword(Keyword::Channel) if matches!(self.peek_at(1), Some(TokenKind::Identifier(_))) => {
                self.advance();
                let (name, _, _) = self.ident_name()?;
                let args = if self.matches(&TokenKind::LParen) {
                    let a = self.arg_list()?;
                    self.expect(&TokenKind::RParen, "')'")?;
                    a
                } else {
                    Vec::new()
                };
                self.consume_terminator();
                Ok(Stmt::Let {
                    name,
                    pattern: None,
                    mutable: false,
                    immutable: false,
                    type_ann: None,
                    init: Some(Expr::Channel { args, line: tok.line, column: tok.column }),
                    line: tok.line,
                    column: tok.column,
                })
            }
            TokenKind::Keyword(Keyword::Select) => self.select_stmt(),
            TokenKind::Keyword(Keyword::Require)
                if matches!(self.peek_at(1), Some(TokenKind::LParen))
                    && matches!(self.peek_at(2), Some(TokenKind::Keyword(Keyword::Ntl))) =>
            {
                self.advance();
                self.advance();
                self.advance();
                self.matches(&TokenKind::Comma);
                let mut modules = Vec::new();
                while !self.check(&TokenKind::RParen) {
                    modules.push(self.ident_name()?.0);
                    if !self.matches(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(&TokenKind::RParen, "')'")?;
                self.consume_terminator();
                Ok(Stmt::NTLRequire { modules, line: tok.line, column: tok.column })
            }
            TokenKind::Keyword(Keyword::Try) => self.try_stmt(),
            TokenKind::Keyword(Keyword::Throw) => {
                self.advance();
                let value = self.expression()?;
                self.consume_terminator();
                Ok(Stmt::Throw { value, line: tok.line, column: tok.column })
            }
            TokenKind::LBrace => {
                let body = self.block()?;
                Ok(Stmt::Block { body, line: tok.line, column: tok.column })
            }
            _ => {
                let expr = self.expression()?;
                self.consume_terminator();
                Ok(Stmt::Expr { expr, line: tok.line, column: tok.column })
            }
        }
    }

    /// True when the current token is `async` immediately followed by `fn` —
    /// distinguishes an async function declaration from an async arrow
    /// expression (`async (x) => ...`), which `primary()` parses instead.
    fn is_async_fn_ahead(&self) -> bool {
        self.check_keyword(Keyword::Async) && matches!(self.peek_at(1), Some(TokenKind::Keyword(Keyword::Fn)))
    }

    fn consume_terminator(&mut self) {
        // Semicolons are optional; a statement ends at `;`, `}` or EOF.
        self.matches(&TokenKind::Semicolon);
    }

    fn decorators(&mut self) -> PResult<Vec<Decorator>> {
        let mut decorators = Vec::new();
        while self.check(&TokenKind::At) {
            let tok = self.advance();
            let (name, _, _) = self.ident_name()?;
            let args = if self.matches(&TokenKind::LParen) {
                let a = self.arg_list()?;
                self.expect(&TokenKind::RParen, "')'")?;
                a
            } else {
                Vec::new()
            };
            decorators.push(Decorator { name, args, line: tok.line, column: tok.column });
        }
        Ok(decorators)
    }

    fn let_stmt(&mut self) -> PResult<Stmt> {
        let start = self.current().clone();
        let immutable = self.matches_keyword(Keyword::Immutable);
        let mutable = matches!(self.peek(), TokenKind::Keyword(Keyword::Var));
        self.advance();
        let (pattern, name) = self.binding_target()?;
        let type_ann = if self.matches(&TokenKind::Colon) {
            Some(self.type_expr()?)
        } else {
            None
        };
        let init = if self.matches(&TokenKind::Assign) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume_terminator();
        Ok(Stmt::Let {
            name,
            pattern,
            mutable,
            immutable,
            type_ann,
            init,
            line: start.line,
            column: start.column,
        })
    }

    fn binding_target(&mut self) -> PResult<(Option<Pattern>, String)> {
        match self.peek().clone() {
            TokenKind::LBracket | TokenKind::LBrace => {
                let pattern = self.destructure_pattern()?;
                Ok((Some(pattern), String::new()))
            }
            _ => {
                let (name, _, _) = self.ident_name()?;
                Ok((None, name))
            }
        }
    }

    fn destructure_pattern(&mut self) -> PResult<Pattern> {
        if self.matches(&TokenKind::LBracket) {
            let mut elements = Vec::new();
            let mut rest = None;
            while !self.check(&TokenKind::RBracket) {
                if self.matches(&TokenKind::DotDotDot) {
                    let (name, _, _) = self.ident_name()?;
                    rest = Some(name);
                } else {
                    elements.push(self.destructure_pattern()?);
                }
                if !self.matches(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(&TokenKind::RBracket, "']'")?;
            Ok(Pattern::Array { elements, rest })
        } else if self.matches(&TokenKind::LBrace) {
            let mut fields = Vec::new();
            let mut rest = None;
            while !self.check(&TokenKind::RBrace) {
                if self.matches(&TokenKind::DotDotDot) {
                    let (name, _, _) = self.ident_name()?;
                    rest = Some(name);
                } else {
                    let (name, _, _) = self.ident_name()?;
                    let binding = if self.matches(&TokenKind::Colon) {
                        self.destructure_pattern()?
                    } else {
                        Pattern::Name(name.clone())
                    };
                    fields.push((name, binding));
                }
                if !self.matches(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(&TokenKind::RBrace, "'}'")?;
            Ok(Pattern::Object { fields, rest })
        } else {
            let (name, _, _) = self.ident_name()?;
            Ok(Pattern::Name(name))
        }
    }

    fn param_list(&mut self) -> PResult<Vec<Param>> {
        self.expect(&TokenKind::LParen, "'('")?;
        let mut params = Vec::new();
        while !self.check(&TokenKind::RParen) {
            let tok = self.current().clone();
            let (name, line, column) = self.ident_name()?;
            let type_ann = if self.matches(&TokenKind::Colon) {
                Some(self.type_expr()?)
            } else {
                None
            };
            let default = if self.matches(&TokenKind::Assign) {
                Some(self.expression()?)
            } else {
                None
            };
            let _ = tok;
            params.push(Param { name, type_ann, default, line, column });
            if !self.matches(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen, "')'")?;
        Ok(params)
    }

    fn fn_stmt(&mut self, decorators: Vec<Decorator>) -> PResult<Stmt> {
        let start = self.current().clone();
        let is_async = self.matches_keyword(Keyword::Async);
        self.advance();
        let (name, _, _) = self.ident_name()?;
        let params = self.param_list()?;
        let return_type = if self.matches(&TokenKind::Arrow) || self.matches(&TokenKind::FatArrow) {
            Some(self.type_expr()?)
        } else {
            None
        };
        let body = self.block()?;
        Ok(Stmt::Fn {
            name,
            params,
            return_type,
            body,
            decorators,
            is_async,
            line: start.line,
            column: start.column,
        })
    }

    fn if_stmt(&mut self) -> PResult<Stmt> {
        let start = self.current().clone();
        self.advance();
        let cond = self.expression()?;
        let then_branch = self.block()?;
        let else_branch = if self.matches_keyword(Keyword::Else) {
            if self.check_keyword(Keyword::If) {
                Some(vec![self.if_stmt()?])
            } else {
                Some(self.block()?)
            }
        } else {
            None
        };
        Ok(Stmt::If { cond, then_branch, else_branch, line: start.line, column: start.column })
    }

    fn ifset_stmt(&mut self) -> PResult<Stmt> {
        let start = self.current().clone();
        self.advance();
        let (name, _, _) = self.ident_name()?;
        let bind_as = if self.matches_keyword(Keyword::As) {
            Some(self.ident_name()?.0)
        } else {
            None
        };
        let then_branch = self.block()?;
        let else_branch = if self.matches_keyword(Keyword::Else) {
            Some(self.block()?)
        } else {
            None
        };
        Ok(Stmt::Ifset { name, bind_as, then_branch, else_branch, line: start.line, column: start.column })
    }

    fn for_in_stmt(&mut self) -> PResult<Stmt> {
        let start = self.current().clone();
        self.advance();
        let binding = self.destructure_pattern()?;
        if !self.matches_keyword(Keyword::In) && !self.matches_keyword(Keyword::Of) {
            self.error_here("expected 'in' or 'of'", DiagnosticCode::ParseMissingToken);
            return Err(());
        }
        let iterable = self.expression()?;
        let body = self.block()?;
        Ok(Stmt::ForIn { binding, iterable, body, line: start.line, column: start.column })
    }

    fn match_stmt(&mut self) -> PResult<Stmt> {
        let start = self.current().clone();
        self.advance();
        let subject = self.expression()?;
        self.expect(&TokenKind::LBrace, "'{'")?;
        let mut arms = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            let pattern = self.match_pattern()?;
            let guard = if self.matches_keyword(Keyword::When) {
                Some(self.expression()?)
            } else {
                None
            };
            self.expect(&TokenKind::FatArrow, "'=>'")?;
            let body = if self.check(&TokenKind::LBrace) {
                self.block()?
            } else {
                let expr = self.expression()?;
                vec![Stmt::Expr { line: 0, column: 0, expr }]
            };
            self.matches(&TokenKind::Comma);
            arms.push(MatchArm { pattern, guard, body });
        }
        self.expect(&TokenKind::RBrace, "'}'")?;
        Ok(Stmt::Match { subject, arms, line: start.line, column: start.column })
    }

    fn match_pattern(&mut self) -> PResult<MatchPattern> {
        let first = self.match_pattern_atom()?;
        if self.matches(&TokenKind::Pipe) {
            let mut options = vec![first];
            loop {
                options.push(self.match_pattern_atom()?);
                if !self.matches(&TokenKind::Pipe) {
                    break;
                }
            }
            Ok(MatchPattern::Or(options))
        } else {
            Ok(first)
        }
    }

    fn match_pattern_atom(&mut self) -> PResult<MatchPattern> {
        match self.peek().clone() {
            TokenKind::Identifier(name) if name == "_" => {
                self.advance();
                Ok(MatchPattern::Wildcard)
            }
            // `default` and `else` are interchangeable catch-all arms.
            TokenKind::Keyword(Keyword::Else) => {
                self.advance();
                Ok(MatchPattern::Wildcard)
            }
            TokenKind::Keyword(Keyword::Default) => {
                self.advance();
                Ok(MatchPattern::Wildcard)
            }
            TokenKind::Identifier(name) => {
                self.advance();
                if self.matches(&TokenKind::LParen) {
                    let mut bindings = Vec::new();
                    while !self.check(&TokenKind::RParen) {
                        bindings.push(self.ident_name()?.0);
                        if !self.matches(&TokenKind::Comma) {
                            break;
                        }
                    }
                    self.expect(&TokenKind::RParen, "')'")?;
                    Ok(MatchPattern::Variant { name, bindings })
                } else {
                    Ok(MatchPattern::Binding(name))
                }
            }
            TokenKind::LBrace => {
                self.advance();
                let mut fields = Vec::new();
                while !self.check(&TokenKind::RBrace) {
                    let (name, _, _) = self.ident_name()?;
                    let pattern = if self.matches(&TokenKind::Colon) {
                        self.match_pattern()?
                    } else {
                        MatchPattern::Binding(name.clone())
                    };
                    fields.push((name, pattern));
                    if !self.matches(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(&TokenKind::RBrace, "'}'")?;
                Ok(MatchPattern::Object { fields })
            }
            TokenKind::LBracket => {
                self.advance();
                let mut elements = Vec::new();
                let mut rest = None;
                while !self.check(&TokenKind::RBracket) {
                    if self.matches(&TokenKind::DotDotDot) {
                        rest = Some(self.ident_name()?.0);
                    } else {
                        elements.push(self.match_pattern()?);
                    }
                    if !self.matches(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(&TokenKind::RBracket, "']'")?;
                Ok(MatchPattern::Array { elements, rest })
            }
            _ => Ok(MatchPattern::Literal(self.unary()?)),
        }
    }

    fn class_stmt(&mut self, decorators: Vec<Decorator>) -> PResult<Stmt> {
        let start = self.current().clone();
        self.expect_keyword(Keyword::Class, "'class'")?;
        let (name, _, _) = self.ident_name()?;
        let superclass = if self.matches_keyword(Keyword::Super) {
            Some(self.ident_name()?.0)
        } else {
            None
        };
        let mut interfaces = Vec::new();
        if self.matches_keyword(Keyword::As) {
            loop {
                interfaces.push(self.ident_name()?.0);
                if !self.matches(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::LBrace, "'{'")?;
        let mut fields = Vec::new();
        let mut methods = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            if self.check_keyword(Keyword::Fn) {
                methods.push(self.fn_stmt(Vec::new())?);
            } else {
                let mutable = matches!(self.peek(), TokenKind::Keyword(Keyword::Var));
                self.matches(&TokenKind::Keyword(Keyword::Val));
                self.matches(&TokenKind::Keyword(Keyword::Var));
                let (name, _, _) = self.ident_name()?;
                let type_ann = if self.matches(&TokenKind::Colon) {
                    Some(self.type_expr()?)
                } else {
                    None
                };
                let default = if self.matches(&TokenKind::Assign) {
                    Some(self.expression()?)
                } else {
                    None
                };
                self.consume_terminator();
                fields.push(ClassField { name, type_ann, default, mutable });
            }
        }
        self.expect(&TokenKind::RBrace, "'}'")?;
        Ok(Stmt::Class {
            name,
            superclass,
            interfaces,
            fields,
            methods,
            decorators,
            line: start.line,
            column: start.column,
        })
    }

    fn interface_stmt(&mut self) -> PResult<Stmt> {
        let start = self.current().clone();
        self.advance();
        let (name, _, _) = self.ident_name()?;
        self.expect(&TokenKind::LBrace, "'{'")?;
        let mut members = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            let (field_name, _, _) = self.ident_name()?;
            self.expect(&TokenKind::Colon, "':'")?;
            let ty = self.type_expr()?;
            self.consume_terminator();
            members.push((field_name, ty));
        }
        self.expect(&TokenKind::RBrace, "'}'")?;
        Ok(Stmt::Interface { name, members, line: start.line, column: start.column })
    }

    fn type_stmt(&mut self) -> PResult<Stmt> {
        let start = self.current().clone();
        self.advance();
        let (name, _, _) = self.ident_name()?;
        self.expect(&TokenKind::Assign, "'='")?;
        if matches!(self.peek(), TokenKind::Identifier(_)) && matches!(self.peek_at(1), Some(TokenKind::LParen)) {
            return self.enum_body(name, start.line, start.column);
        }
        let value = self.type_expr()?;
        self.consume_terminator();
        Ok(Stmt::TypeAlias { name, value, line: start.line, column: start.column })
    }

    fn enum_stmt(&mut self) -> PResult<Stmt> {
        let start = self.current().clone();
        self.advance();
        let (name, _, _) = self.ident_name()?;
        self.enum_body(name, start.line, start.column)
    }

    fn enum_body(&mut self, name: String, line: usize, column: usize) -> PResult<Stmt> {
        // `enum Color { Red, Green }` is brace-delimited and comma-separated;
        // the algebraic `type Shape = Circle(n) | Square(n)` form has neither.
        let braced = self.matches(&TokenKind::LBrace);
        let mut variants = Vec::new();
        loop {
            if braced && self.check(&TokenKind::RBrace) {
                break;
            }
            let (variant_name, _, _) = self.ident_name()?;
            let mut fields = Vec::new();
            let mut value = None;
            if self.matches(&TokenKind::LParen) {
                while !self.check(&TokenKind::RParen) {
                    fields.push(self.type_expr()?);
                    if !self.matches(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(&TokenKind::RParen, "')'")?;
            } else if self.matches(&TokenKind::Assign) {
                match self.current().clone().kind {
                    TokenKind::Number(n) => {
                        self.advance();
                        value = Some(n);
                    }
                    _ => {
                        self.error_here(
                            "expected number literal after '='",
                            DiagnosticCode::ParseUnexpectedToken,
                        );
                        return Err(());
                    }
                }
            }
            variants.push(EnumVariant { name: variant_name, fields, value });
            let more = if braced { self.matches(&TokenKind::Comma) } else { self.matches(&TokenKind::Pipe) };
            if !more {
                break;
            }
        }
        if braced {
            self.expect(&TokenKind::RBrace, "'}'")?;
        }
        self.consume_terminator();
        Ok(Stmt::Enum { name, variants, line, column })
    }

    fn import_stmt(&mut self) -> PResult<Stmt> {
        let start = self.current().clone();
        self.advance();
        let mut names = Vec::new();
        let mut default = None;
        if self.matches(&TokenKind::LBrace) {
            while !self.check(&TokenKind::RBrace) {
                names.push(self.ident_name()?.0);
                if !self.matches(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(&TokenKind::RBrace, "'}'")?;
        } else {
            default = Some(self.ident_name()?.0);
        }
        self.expect_keyword(Keyword::From, "'from'")?;
        let source = self.string_literal()?;
        self.consume_terminator();
        Ok(Stmt::Import { names, default, source, line: start.line, column: start.column })
    }

    /// `select { case v = ch.receive() => { ... } }` — each arm names the
    /// channel expression it races and the binding its received value is
    /// exposed under.
    fn select_stmt(&mut self) -> PResult<Stmt> {
        let start = self.current().clone();
        self.advance();
        self.expect(&TokenKind::LBrace, "'{'")?;
        let mut arms = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            let arm_tok = self.current().clone();
            self.expect_keyword(Keyword::Case, "'case'")?;
            let binding = if matches!(self.peek(), TokenKind::Identifier(_))
                && matches!(self.peek_at(1), Some(TokenKind::Assign))
            {
                let name = self.ident_name()?.0;
                self.expect(&TokenKind::Assign, "'='")?;
                Some(name)
            } else {
                None
            };
            let channel = extract_channel_expr(self.postfix()?);
            self.expect(&TokenKind::FatArrow, "'=>'")?;
            let body = self.block()?;
            self.matches(&TokenKind::Comma);
            arms.push(SelectArm { channel, binding, body, line: arm_tok.line, column: arm_tok.column });
        }
        self.expect(&TokenKind::RBrace, "'}'")?;
        Ok(Stmt::Select { arms, line: start.line, column: start.column })
    }

    fn try_stmt(&mut self) -> PResult<Stmt> {
        let start = self.current().clone();
        self.advance();
        let body = self.block()?;
        let (catch_name, catch_body) = if self.matches_keyword(Keyword::Catch) {
            let name = if self.matches(&TokenKind::LParen) {
                let n = self.ident_name()?.0;
                self.expect(&TokenKind::RParen, "')'")?;
                Some(n)
            } else {
                None
            };
            (name, Some(self.block()?))
        } else {
            (None, None)
        };
        let finally_body = if self.matches_keyword(Keyword::Finally) {
            Some(self.block()?)
        } else {
            None
        };
        if catch_body.is_none() && finally_body.is_none() {
            self.error_here(
                "'try' block has no 'catch' or 'finally' handler",
                DiagnosticCode::TryNoHandler,
            );
        }
        Ok(Stmt::Try {
            body,
            catch_name,
            catch_body,
            finally_body,
            line: start.line,
            column: start.column,
        })
    }

    fn string_literal(&mut self) -> PResult<String> {
        match self.current().clone().kind {
            TokenKind::String(s) => {
                self.advance();
                Ok(s)
            }
            _ => {
                self.error_here("expected string literal", DiagnosticCode::ParseUnexpectedToken);
                Err(())
            }
        }
    }

    fn arg_list(&mut self) -> PResult<Vec<Expr>> {
        let mut args = Vec::new();
        while !self.check(&TokenKind::RParen) {
            args.push(self.expression()?);
            if !self.matches(&TokenKind::Comma) {
                break;
            }
        }
        Ok(args)
    }

    // ---- type expressions ----

    fn type_expr(&mut self) -> PResult<TypeExpr> {
        let first = self.type_atom()?;
        if self.check(&TokenKind::Pipe) {
            let mut members = vec![first];
            while self.matches(&TokenKind::Pipe) {
                members.push(self.type_atom()?);
            }
            Ok(TypeExpr::Union(members))
        } else {
            Ok(first)
        }
    }

    fn type_atom(&mut self) -> PResult<TypeExpr> {
        let ty = match self.peek().clone() {
            TokenKind::LBracket => {
                self.advance();
                let inner = self.type_expr()?;
                self.expect(&TokenKind::RBracket, "']'")?;
                TypeExpr::Array(Box::new(inner))
            }
            TokenKind::LBrace => {
                self.advance();
                let mut fields = Vec::new();
                while !self.check(&TokenKind::RBrace) {
                    let (name, _, _) = self.ident_name()?;
                    self.expect(&TokenKind::Colon, "':'")?;
                    let ty = self.type_expr()?;
                    fields.push((name, ty));
                    if !self.matches(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(&TokenKind::RBrace, "'}'")?;
                TypeExpr::Object(fields)
            }
            TokenKind::String(s) => {
                self.advance();
                TypeExpr::Literal(Expr::Str(s, 0, 0))
            }
            TokenKind::Number(n) => {
                self.advance();
                TypeExpr::Literal(Expr::Number(n, 0, 0))
            }
            _ => {
                let (name, _, _) = self.ident_name()?;
                if self.matches(&TokenKind::Lt) {
                    let mut args = Vec::new();
                    while !self.check(&TokenKind::Gt) {
                        args.push(self.type_expr()?);
                        if !self.matches(&TokenKind::Comma) {
                            break;
                        }
                    }
                    self.expect(&TokenKind::Gt, "'>'")?;
                    TypeExpr::Generic { name, args }
                } else {
                    TypeExpr::Named(name)
                }
            }
        };
        if self.matches(&TokenKind::Question) {
            Ok(TypeExpr::Optional(Box::new(ty)))
        } else {
            Ok(ty)
        }
    }

    // ---- expressions ----

    pub fn expression(&mut self) -> PResult<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> PResult<Expr> {
        let expr = self.pipeline()?;
        let op = match self.peek() {
            TokenKind::Assign => Some(AssignOp::Assign),
            TokenKind::PlusAssign => Some(AssignOp::Add),
            TokenKind::MinusAssign => Some(AssignOp::Sub),
            TokenKind::StarAssign => Some(AssignOp::Mul),
            TokenKind::SlashAssign => Some(AssignOp::Div),
            TokenKind::PercentAssign => Some(AssignOp::Mod),
            TokenKind::StarStarAssign => Some(AssignOp::Pow),
            TokenKind::AmpAmpAssign => Some(AssignOp::And),
            TokenKind::PipePipeAssign => Some(AssignOp::Or),
            TokenKind::QuestionQuestionAssign => Some(AssignOp::NullishCoalesce),
            TokenKind::LtLtAssign => Some(AssignOp::Shl),
            TokenKind::GtGtAssign => Some(AssignOp::Shr),
            _ => None,
        };
        if let Some(op) = op {
            let tok = self.advance();
            let value = self.assignment()?;
            if op == AssignOp::Assign {
                if let Expr::Assign { target: inner_target, value: inner_value, .. } = &value {
                    let mut targets = vec![expr.clone(), (**inner_target).clone()];
                    let mut tail = (**inner_value).clone();
                    // Flatten `a = b = c` into a single chained-assign node;
                    // `a = b = c = d` flattens further via the recursive call above.
                    if let Expr::ChainedAssign { targets: inner_targets, value: v, .. } = tail.clone() {
                        targets.extend(inner_targets);
                        tail = *v;
                    }
                    return Ok(Expr::ChainedAssign {
                        targets,
                        value: Box::new(tail),
                        line: tok.line,
                        column: tok.column,
                    });
                }
            }
            Ok(Expr::Assign {
                target: Box::new(expr),
                op,
                value: Box::new(value),
                line: tok.line,
                column: tok.column,
            })
        } else {
            Ok(expr)
        }
    }

    fn pipeline(&mut self) -> PResult<Expr> {
        let first = self.conditional()?;
        if self.check(&TokenKind::Pipeline) {
            let (line, column) = first.line_col();
            let mut stages = vec![first];
            while self.matches(&TokenKind::Pipeline) {
                stages.push(self.conditional()?);
            }
            Ok(Expr::Pipeline { stages, line, column })
        } else {
            Ok(first)
        }
    }

    fn conditional(&mut self) -> PResult<Expr> {
        let cond = self.nullish()?;
        if self.matches(&TokenKind::Question) {
            let then_branch = self.assignment()?;
            self.expect(&TokenKind::Colon, "':'")?;
            let else_branch = self.assignment()?;
            let (line, column) = cond.line_col();
            Ok(Expr::Conditional {
                cond: Box::new(cond),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
                line,
                column,
            })
        } else {
            Ok(cond)
        }
    }

    fn nullish(&mut self) -> PResult<Expr> {
        let mut left = self.logical_or()?;
        while self.matches(&TokenKind::QuestionQuestion) {
            let (line, column) = left.line_col();
            let right = self.logical_or()?;
            left = Expr::Binary {
                op: BinaryOp::NullishCoalesce,
                left: Box::new(left),
                right: Box::new(right),
                line,
                column,
            };
        }
        Ok(left)
    }

    fn logical_or(&mut self) -> PResult<Expr> {
        let mut left = self.logical_and()?;
        while self.matches(&TokenKind::PipePipe) {
            let (line, column) = left.line_col();
            let right = self.logical_and()?;
            left = Expr::Logical { op: LogicalOp::Or, left: Box::new(left), right: Box::new(right), line, column };
        }
        Ok(left)
    }

    fn logical_and(&mut self) -> PResult<Expr> {
        let mut left = self.bitwise_or()?;
        while self.matches(&TokenKind::AmpAmp) {
            let (line, column) = left.line_col();
            let right = self.bitwise_or()?;
            left = Expr::Logical { op: LogicalOp::And, left: Box::new(left), right: Box::new(right), line, column };
        }
        Ok(left)
    }

    fn bitwise_or(&mut self) -> PResult<Expr> {
        let mut left = self.bitwise_xor()?;
        while self.matches(&TokenKind::Pipe) {
            let (line, column) = left.line_col();
            let right = self.bitwise_xor()?;
            left = Expr::Binary { op: BinaryOp::BitOr, left: Box::new(left), right: Box::new(right), line, column };
        }
        Ok(left)
    }

    fn bitwise_xor(&mut self) -> PResult<Expr> {
        let mut left = self.bitwise_and()?;
        while self.matches(&TokenKind::Caret) {
            let (line, column) = left.line_col();
            let right = self.bitwise_and()?;
            left = Expr::Binary { op: BinaryOp::BitXor, left: Box::new(left), right: Box::new(right), line, column };
        }
        Ok(left)
    }

    fn bitwise_and(&mut self) -> PResult<Expr> {
        let mut left = self.equality()?;
        while self.matches(&TokenKind::Amp) {
            let (line, column) = left.line_col();
            let right = self.equality()?;
            left = Expr::Binary { op: BinaryOp::BitAnd, left: Box::new(left), right: Box::new(right), line, column };
        }
        Ok(left)
    }

    fn equality(&mut self) -> PResult<Expr> {
        let mut left = self.relational()?;
        loop {
            let op = match self.peek() {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::EqEqEq => BinaryOp::StrictEq,
                TokenKind::NotEq => BinaryOp::NotEq,
                TokenKind::NotEqEq => BinaryOp::StrictNotEq,
                _ => break,
            };
            let (line, column) = left.line_col();
            self.advance();
            let right = self.relational()?;
            left = Expr::Binary { op, left: Box::new(left), right: Box::new(right), line, column };
        }
        Ok(left)
    }

    fn relational(&mut self) -> PResult<Expr> {
        let mut left = self.shift()?;
        loop {
            let op = match self.peek() {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::LtEq => BinaryOp::LtEq,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::GtEq => BinaryOp::GtEq,
                TokenKind::Keyword(Keyword::Instanceof) => BinaryOp::Instanceof,
                TokenKind::Keyword(Keyword::In) => BinaryOp::In,
                _ => break,
            };
            let (line, column) = left.line_col();
            self.advance();
            let right = self.shift()?;
            left = Expr::Binary { op, left: Box::new(left), right: Box::new(right), line, column };
        }
        Ok(left)
    }

    fn shift(&mut self) -> PResult<Expr> {
        let mut left = self.additive()?;
        loop {
            let op = match self.peek() {
                TokenKind::LtLt => BinaryOp::Shl,
                TokenKind::GtGt => BinaryOp::Shr,
                TokenKind::GtGtGt => BinaryOp::UShr,
                _ => break,
            };
            let (line, column) = left.line_col();
            self.advance();
            let right = self.additive()?;
            left = Expr::Binary { op, left: Box::new(left), right: Box::new(right), line, column };
        }
        Ok(left)
    }

    fn additive(&mut self) -> PResult<Expr> {
        let mut left = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            let (line, column) = left.line_col();
            self.advance();
            let right = self.multiplicative()?;
            left = Expr::Binary { op, left: Box::new(left), right: Box::new(right), line, column };
        }
        Ok(left)
    }

    fn multiplicative(&mut self) -> PResult<Expr> {
        let mut left = self.power()?;
        loop {
            let op = match self.peek() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            let (line, column) = left.line_col();
            self.advance();
            let right = self.power()?;
            left = Expr::Binary { op, left: Box::new(left), right: Box::new(right), line, column };
        }
        Ok(left)
    }

    fn power(&mut self) -> PResult<Expr> {
        let base = self.unary()?;
        if self.matches(&TokenKind::StarStar) {
            let (line, column) = base.line_col();
            // Right-associative: `2 ** 3 ** 2` parses as `2 ** (3 ** 2)`.
            let exponent = self.power()?;
            Ok(Expr::Binary { op: BinaryOp::Pow, left: Box::new(base), right: Box::new(exponent), line, column })
        } else {
            Ok(base)
        }
    }

    fn unary(&mut self) -> PResult<Expr> {
        let tok = self.current().clone();
        let op = match &tok.kind {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Plus => Some(UnaryOp::Pos),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let expr = self.unary()?;
            return Ok(Expr::Unary { op, expr: Box::new(expr), line: tok.line, column: tok.column });
        }
        if matches!(&tok.kind, TokenKind::PlusPlus | TokenKind::MinusMinus) {
            let inc = matches!(tok.kind, TokenKind::PlusPlus);
            self.advance();
            let target = self.unary()?;
            return Ok(Expr::Update {
                op: if inc { UpdateOp::Inc } else { UpdateOp::Dec },
                prefix: true,
                target: Box::new(target),
                line: tok.line,
                column: tok.column,
            });
        }
        if matches!(&tok.kind, TokenKind::Identifier(name) if name == "typeof") {
            self.advance();
            let expr = self.unary()?;
            return Ok(Expr::Unary { op: UnaryOp::Typeof, expr: Box::new(expr), line: tok.line, column: tok.column });
        }
        if self.matches_keyword(Keyword::Void) {
            let expr = self.unary()?;
            return Ok(Expr::Unary { op: UnaryOp::Void, expr: Box::new(expr), line: tok.line, column: tok.column });
        }
        if self.matches_keyword(Keyword::Delete) {
            let expr = self.unary()?;
            return Ok(Expr::Unary { op: UnaryOp::Delete, expr: Box::new(expr), line: tok.line, column: tok.column });
        }
        if self.matches_keyword(Keyword::Freeze) {
            let expr = self.unary()?;
            return Ok(Expr::Freeze { expr: Box::new(expr), line: tok.line, column: tok.column });
        }
        if matches!(&tok.kind, TokenKind::Identifier(name) if name == "await") {
            self.advance();
            let expr = self.unary()?;
            return Ok(Expr::Await { expr: Box::new(expr), line: tok.line, column: tok.column });
        }
        if self.matches_keyword(Keyword::Yield) {
            let delegate = self.matches(&TokenKind::Star);
            let value = if self.can_start_expression() {
                Some(Box::new(self.unary()?))
            } else {
                None
            };
            return Ok(Expr::Yield { value, delegate, line: tok.line, column: tok.column });
        }
        self.postfix()
    }

    /// Whether the current token could begin an expression — used to decide
    /// if a bare `yield` has a trailing value.
    fn can_start_expression(&self) -> bool {
        !matches!(
            self.peek(),
            TokenKind::Semicolon
                | TokenKind::RParen
                | TokenKind::RBrace
                | TokenKind::RBracket
                | TokenKind::Comma
                | TokenKind::Eof
        )
    }

    fn postfix(&mut self) -> PResult<Expr> {
        let mut expr = self.primary()?;
        loop {
            let tok = self.current().clone();
            match &tok.kind {
                TokenKind::PlusPlus => {
                    self.advance();
                    expr = Expr::Update {
                        op: UpdateOp::Inc,
                        prefix: false,
                        target: Box::new(expr),
                        line: tok.line,
                        column: tok.column,
                    };
                }
                TokenKind::MinusMinus => {
                    self.advance();
                    expr = Expr::Update {
                        op: UpdateOp::Dec,
                        prefix: false,
                        target: Box::new(expr),
                        line: tok.line,
                        column: tok.column,
                    };
                }
                TokenKind::Keyword(Keyword::As) | TokenKind::Keyword(Keyword::Satisfies) => {
                    self.advance();
                    // Type assertions are erased; only the checked expression survives.
                    self.type_expr()?;
                }
                TokenKind::Dot => {
                    self.advance();
                    let (name, _, _) = self.ident_name()?;
                    expr = Expr::Member {
                        object: Box::new(expr),
                        property: name,
                        optional: false,
                        line: tok.line,
                        column: tok.column,
                    };
                }
                TokenKind::QuestionDot => {
                    self.advance();
                    let (name, _, _) = self.ident_name()?;
                    expr = Expr::Member {
                        object: Box::new(expr),
                        property: name,
                        optional: true,
                        line: tok.line,
                        column: tok.column,
                    };
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.expression()?;
                    self.expect(&TokenKind::RBracket, "']'")?;
                    expr = Expr::Index { object: Box::new(expr), index: Box::new(index), line: tok.line, column: tok.column };
                }
                TokenKind::LParen => {
                    self.advance();
                    let args = self.arg_list()?;
                    self.expect(&TokenKind::RParen, "')'")?;
                    expr = Expr::Call { callee: Box::new(expr), args, line: tok.line, column: tok.column };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    /// Look ahead far enough past a `(` to decide whether this is a
    /// parenthesized lambda parameter list (`(a, b) => ...`) or a grouped
    /// expression — cheap enough to just scan forward to the matching `)`.
    fn looks_like_lambda_params(&self) -> bool {
        let mut depth = 0usize;
        let mut i = self.pos;
        loop {
            match self.tokens.get(i).map(|t| &t.kind) {
                Some(TokenKind::LParen) => depth += 1,
                Some(TokenKind::RParen) => {
                    depth -= 1;
                    if depth == 0 {
                        return matches!(self.tokens.get(i + 1).map(|t| &t.kind), Some(TokenKind::FatArrow));
                    }
                }
                Some(TokenKind::Eof) | None => return false,
                _ => {}
            }
            i += 1;
        }
    }

    fn primary(&mut self) -> PResult<Expr> {
        let tok = self.current().clone();
        match tok.kind {
            TokenKind::Number(n) => {
                self.advance();
                Ok(Expr::Number(n, tok.line, tok.column))
            }
            TokenKind::BigInt(s) => {
                self.advance();
                Ok(Expr::BigInt(s, tok.line, tok.column))
            }
            TokenKind::String(s) => {
                self.advance();
                Ok(Expr::Str(s, tok.line, tok.column))
            }
            TokenKind::Template(parts) => {
                self.advance();
                let mut chunks = Vec::new();
                for part in parts {
                    match part {
                        TemplatePart::Literal(s) => chunks.push(TemplateChunk::Literal(s)),
                        TemplatePart::Expr(src) => {
                            let (tokens, mut diags) = crate::lexer::tokenize(&src, &self.file.url);
                            self.diagnostics.append(&mut diags);
                            let (expr, mut diags) =
                                Parser::new(tokens, self.file.clone()).parse_expr_only();
                            self.diagnostics.append(&mut diags);
                            chunks.push(TemplateChunk::Expr(Box::new(expr)));
                        }
                    }
                }
                Ok(Expr::Template(chunks, tok.line, tok.column))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::Bool(true, tok.line, tok.column))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::Bool(false, tok.line, tok.column))
            }
            TokenKind::Null => {
                self.advance();
                Ok(Expr::Null(tok.line, tok.column))
            }
            TokenKind::Undefined => {
                self.advance();
                Ok(Expr::Undefined(tok.line, tok.column))
            }
            TokenKind::Keyword(Keyword::This) => {
                self.advance();
                Ok(Expr::This(tok.line, tok.column))
            }
            TokenKind::Keyword(Keyword::Super) => {
                self.advance();
                Ok(Expr::Super(tok.line, tok.column))
            }
            TokenKind::Keyword(Keyword::New) => {
                self.advance();
                let callee = self.postfix_callee_only()?;
                let args = if self.matches(&TokenKind::LParen) {
                    let a = self.arg_list()?;
                    self.expect(&TokenKind::RParen, "')'")?;
                    a
                } else {
                    Vec::new()
                };
                Ok(Expr::New { callee: Box::new(callee), args, line: tok.line, column: tok.column })
            }
            TokenKind::Identifier(name) => {
                if matches!(self.peek_at(1), Some(TokenKind::FatArrow)) {
                    self.advance();
                    self.advance();
                    let param = Param { name, type_ann: None, default: None, line: tok.line, column: tok.column };
                    let body = self.lambda_body()?;
                    return Ok(Expr::Lambda { params: vec![param], body, is_async: false, line: tok.line, column: tok.column });
                }
                self.advance();
                Ok(Expr::Ident(name, tok.line, tok.column))
            }
            TokenKind::LParen => {
                if self.looks_like_lambda_params() {
                    let params = self.param_list()?;
                    self.expect(&TokenKind::FatArrow, "'=>'")?;
                    let body = self.lambda_body()?;
                    Ok(Expr::Lambda { params, body, is_async: false, line: tok.line, column: tok.column })
                } else {
                    self.advance();
                    let inner = self.expression()?;
                    self.expect(&TokenKind::RParen, "')'")?;
                    Ok(inner)
                }
            }
            TokenKind::Keyword(Keyword::Channel) => {
                self.advance();
                let args = if self.matches(&TokenKind::LParen) {
                    let a = self.arg_list()?;
                    self.expect(&TokenKind::RParen, "')'")?;
                    a
                } else {
                    Vec::new()
                };
                Ok(Expr::Channel { args, line: tok.line, column: tok.column })
            }
            TokenKind::Keyword(Keyword::Require) => {
                self.advance();
                Ok(Expr::Ident("require".to_string(), tok.line, tok.column))
            }
            TokenKind::Keyword(Keyword::Async) => {
                self.advance();
                if matches!(self.peek(), TokenKind::Identifier(_)) && matches!(self.peek_at(1), Some(TokenKind::FatArrow)) {
                    let (name, line, column) = self.ident_name()?;
                    self.advance();
                    let param = Param { name, type_ann: None, default: None, line, column };
                    let body = self.lambda_body()?;
                    return Ok(Expr::Lambda { params: vec![param], body, is_async: true, line: tok.line, column: tok.column });
                }
                let params = self.param_list()?;
                self.expect(&TokenKind::FatArrow, "'=>'")?;
                let body = self.lambda_body()?;
                Ok(Expr::Lambda { params, body, is_async: true, line: tok.line, column: tok.column })
            }
            TokenKind::LBracket => {
                self.advance();
                let mut elements = Vec::new();
                while !self.check(&TokenKind::RBracket) {
                    elements.push(self.expression()?);
                    if !self.matches(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(&TokenKind::RBracket, "']'")?;
                Ok(Expr::Array(elements, tok.line, tok.column))
            }
            TokenKind::LBrace => {
                self.advance();
                let mut fields = Vec::new();
                while !self.check(&TokenKind::RBrace) {
                    let key = match self.current().clone().kind {
                        TokenKind::Identifier(name) => {
                            self.advance();
                            name
                        }
                        TokenKind::String(s) => {
                            self.advance();
                            s
                        }
                        _ => {
                            self.error_here("expected object key", DiagnosticCode::ParseUnexpectedToken);
                            return Err(());
                        }
                    };
                    let value = if self.matches(&TokenKind::Colon) {
                        self.expression()?
                    } else {
                        Expr::Ident(key.clone(), tok.line, tok.column)
                    };
                    fields.push((key, value));
                    if !self.matches(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(&TokenKind::RBrace, "'}'")?;
                Ok(Expr::Object(fields, tok.line, tok.column))
            }
            _ => {
                self.error_here(
                    format!("unexpected token {:?}", tok.kind),
                    DiagnosticCode::ParseUnexpectedToken,
                );
                Err(())
            }
        }
    }

    fn postfix_callee_only(&mut self) -> PResult<Expr> {
        let mut expr = self.primary()?;
        while self.matches(&TokenKind::Dot) {
            let tok = self.current().clone();
            let (name, _, _) = self.ident_name()?;
            expr = Expr::Member { object: Box::new(expr), property: name, optional: false, line: tok.line, column: tok.column };
        }
        Ok(expr)
    }

    fn lambda_body(&mut self) -> PResult<LambdaBody> {
        if self.check(&TokenKind::LBrace) {
            Ok(LambdaBody::Block(self.block()?))
        } else {
            Ok(LambdaBody::Expr(Box::new(self.assignment()?)))
        }
    }

    fn parse_expr_only(mut self) -> (Expr, Vec<Diagnostic>) {
        let expr = self.expression().unwrap_or_else(|_| {
            let tok = self.current().clone();
            Expr::Undefined(tok.line, tok.column)
        });
        (expr, self.diagnostics)
    }
}

/// `ch.receive()` parses as `Call { callee: Member { object: ch, .. }, .. }`;
/// a select arm only cares about the channel (`ch`), not the method call.
fn extract_channel_expr(expr: Expr) -> Expr {
    match expr {
        Expr::Call { callee, .. } => match *callee {
            Expr::Member { object, .. } => *object,
            other => other,
        },
        other => other,
    }
}

pub fn parse(tokens: Vec<Token>, file: SourceFile) -> (Program, Vec<Diagnostic>) {
    Parser::new(tokens, file).parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::SourceFile as SF;
    use crate::lexer::tokenize;

    fn parse_src(src: &str) -> (Program, Vec<Diagnostic>) {
        let (tokens, mut lex_diags) = tokenize(src, "t.ntl");
        let file = SF::new(src, "t.ntl");
        let (prog, mut parse_diags) = parse(tokens, file);
        lex_diags.append(&mut parse_diags);
        (prog, lex_diags)
    }

    #[test]
    fn parses_val_declaration() {
        let (prog, diags) = parse_src("val x = 1 + 2");
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(prog.statements.len(), 1);
        match &prog.statements[0] {
            Stmt::Let { mutable, init: Some(_), .. } => assert!(!mutable),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parses_function_and_call() {
        let (prog, diags) = parse_src("fn add(a, b) { return a + b }\nadd(1, 2)");
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(prog.statements.len(), 2);
    }

    #[test]
    fn parses_match_with_variant_pattern() {
        let src = "match shape {\n  Circle(r) => r * r,\n  _ => 0,\n}";
        let (prog, diags) = parse_src(src);
        assert!(diags.is_empty(), "{diags:?}");
        match &prog.statements[0] {
            Stmt::Match { arms, .. } => assert_eq!(arms.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parses_pipeline() {
        let (prog, diags) = parse_src("val y = x |> double |> inc");
        assert!(diags.is_empty(), "{diags:?}");
        match &prog.statements[0] {
            Stmt::Let { init: Some(Expr::Pipeline { stages, .. }), .. } => assert_eq!(stages.len(), 3),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn reports_missing_closing_brace() {
        let (_, diags) = parse_src("fn f() { return 1");
        assert!(!diags.is_empty());
    }
}
