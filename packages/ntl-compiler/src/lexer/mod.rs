//! Turns source text into a token stream.
//!
//! Numeric literals accept hex/binary/octal prefixes, `_` digit separators
//! and an `n` bigint suffix. String literals (`"..."`) interpolate with
//! `{expr}`; template literals (`` `...` ``) interpolate with `${expr}`.
//! Both forms track brace depth so a nested `{` inside the interpolated
//! expression doesn't end the substitution early.

pub mod token;

use crate::chars;
use crate::diagnostics::{Diagnostic, DiagnosticCode, LineIndex, Phase, SourceFile, SourceLocation};
pub use token::{Keyword, TemplatePart, Token, TokenKind};

pub struct Lexer<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
    file: SourceFile,
    index: LineIndex,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, file_url: &str) -> Self {
        Lexer {
            source,
            chars: source.chars().collect(),
            pos: 0,
            file: SourceFile::new(source, file_url),
            index: LineIndex::new(source),
            diagnostics: Vec::new(),
        }
    }

    pub fn tokenize(mut self) -> (Vec<Token>, Vec<Diagnostic>) {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia();
            let start = self.pos;
            let Some(ch) = self.peek() else {
                tokens.push(self.make_token(TokenKind::Eof, start));
                break;
            };
            let kind = if chars::is_identifier_start(ch) {
                self.lex_identifier()
            } else if chars::is_digit(ch) {
                self.lex_number()
            } else if ch == '"' {
                self.lex_interpolated_string('"')
            } else if ch == '`' {
                self.lex_interpolated_string('`')
            } else if ch == '\'' {
                self.lex_plain_string()
            } else {
                self.lex_operator()
            };
            if let Some(kind) = kind {
                tokens.push(self.make_token(kind, start));
            }
        }
        (tokens, self.diagnostics)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn location(&self, offset: usize) -> SourceLocation {
        self.index.location(&self.file, offset)
    }

    fn make_token(&self, kind: TokenKind, start: usize) -> Token {
        let (line, column) = self.index.line_col(start);
        Token { kind, line, column, offset: start }
    }

    fn error(&mut self, message: impl Into<String>, offset: usize, code: DiagnosticCode) {
        let loc = self.location(offset);
        self.diagnostics
            .push(Diagnostic::error(Phase::Lex, message, &loc).with_code(code));
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(ch) if chars::is_whitespace(ch) => {
                    self.advance();
                }
                Some('#') => {
                    while let Some(ch) = self.peek() {
                        if chars::is_new_line(ch) {
                            break;
                        }
                        self.advance();
                    }
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    while let Some(ch) = self.peek() {
                        if chars::is_new_line(ch) {
                            break;
                        }
                        self.advance();
                    }
                }
                Some('/') if self.peek_at(1) == Some('*') => {
                    let start = self.pos;
                    self.advance();
                    self.advance();
                    let mut closed = false;
                    while let Some(ch) = self.peek() {
                        if ch == '*' && self.peek_at(1) == Some('/') {
                            self.advance();
                            self.advance();
                            closed = true;
                            break;
                        }
                        self.advance();
                    }
                    if !closed {
                        self.error(
                            "unterminated block comment",
                            start,
                            DiagnosticCode::LexUnterminated,
                        );
                    }
                }
                _ => break,
            }
        }
    }

    fn lex_identifier(&mut self) -> Option<TokenKind> {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if chars::is_identifier_part(ch) {
                self.advance();
            } else {
                break;
            }
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        Some(match text.as_str() {
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,
            "undefined" => TokenKind::Undefined,
            _ => match Keyword::from_str(&text) {
                Some(kw) => TokenKind::Keyword(kw),
                None => TokenKind::Identifier(text),
            },
        })
    }

    fn lex_number(&mut self) -> Option<TokenKind> {
        let start = self.pos;
        if self.peek() == Some('0') {
            match self.peek_at(1) {
                Some('x') | Some('X') => return self.lex_radix_number(start, 16),
                Some('b') | Some('B') => return self.lex_radix_number(start, 2),
                Some('o') | Some('O') => return self.lex_radix_number(start, 8),
                _ => {}
            }
        }
        while matches!(self.peek(), Some(c) if chars::is_digit(c) || c == '_') {
            self.advance();
        }
        let mut is_float = false;
        if self.peek() == Some('.') && matches!(self.peek_at(1), Some(c) if chars::is_digit(c)) {
            is_float = true;
            self.advance();
            while matches!(self.peek(), Some(c) if chars::is_digit(c) || c == '_') {
                self.advance();
            }
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            is_float = true;
            self.advance();
            if matches!(self.peek(), Some('+') | Some('-')) {
                self.advance();
            }
            while matches!(self.peek(), Some(c) if chars::is_digit(c)) {
                self.advance();
            }
        }
        if !is_float && self.peek() == Some('n') {
            let text: String = self.chars[start..self.pos].iter().filter(|c| **c != '_').collect();
            self.advance();
            return Some(TokenKind::BigInt(text));
        }
        let text: String = self.chars[start..self.pos].iter().filter(|c| **c != '_').collect();
        match text.parse::<f64>() {
            Ok(n) => Some(TokenKind::Number(n)),
            Err(_) => {
                self.error("invalid numeric literal", start, DiagnosticCode::LexUnexpectedChar);
                Some(TokenKind::Number(0.0))
            }
        }
    }

    fn lex_radix_number(&mut self, start: usize, radix: u32) -> Option<TokenKind> {
        self.advance();
        self.advance();
        let digits_start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_digit(radix) || c == '_') {
            self.advance();
        }
        let digits: String =
            self.chars[digits_start..self.pos].iter().filter(|c| **c != '_').collect();
        let is_bigint = self.peek() == Some('n');
        if is_bigint {
            self.advance();
        }
        match u64::from_str_radix(&digits, radix) {
            Ok(value) => {
                if is_bigint {
                    Some(TokenKind::BigInt(value.to_string()))
                } else {
                    Some(TokenKind::Number(value as f64))
                }
            }
            Err(_) => {
                self.error("invalid numeric literal", start, DiagnosticCode::LexUnexpectedChar);
                Some(TokenKind::Number(0.0))
            }
        }
    }

    fn lex_plain_string(&mut self) -> Option<TokenKind> {
        let start = self.pos;
        self.advance();
        let mut s = String::new();
        loop {
            match self.peek() {
                None => {
                    self.error(
                        "unterminated string literal",
                        start,
                        DiagnosticCode::LexUnterminated,
                    );
                    break;
                }
                Some('\'') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    if let Some(escaped) = self.advance() {
                        s.push(unescape(escaped));
                    }
                }
                Some(ch) => {
                    s.push(ch);
                    self.advance();
                }
            }
        }
        Some(TokenKind::String(s))
    }

    /// Scans a `"..."` or `` `...` `` literal, splitting on `{`/`${`
    /// interpolation markers while tracking nested brace depth so the
    /// embedded expression can itself contain braces (object literals,
    /// blocks) without ending the substitution early.
    fn lex_interpolated_string(&mut self, quote: char) -> Option<TokenKind> {
        let start = self.pos;
        self.advance();
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut has_interpolation = false;
        loop {
            match self.peek() {
                None => {
                    self.error(
                        "unterminated string literal",
                        start,
                        DiagnosticCode::LexUnterminated,
                    );
                    break;
                }
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    if let Some(escaped) = self.advance() {
                        literal.push(unescape(escaped));
                    }
                }
                Some('$') if quote == '`' && self.peek_at(1) == Some('{') => {
                    has_interpolation = true;
                    parts.push(TemplatePart::Literal(std::mem::take(&mut literal)));
                    self.advance();
                    self.advance();
                    parts.push(TemplatePart::Expr(self.scan_balanced_braces()));
                }
                Some('{') if quote == '"' => {
                    has_interpolation = true;
                    parts.push(TemplatePart::Literal(std::mem::take(&mut literal)));
                    self.advance();
                    parts.push(TemplatePart::Expr(self.scan_balanced_braces()));
                }
                Some(ch) => {
                    literal.push(ch);
                    self.advance();
                }
            }
        }
        parts.push(TemplatePart::Literal(literal));
        if has_interpolation {
            Some(TokenKind::Template(parts))
        } else {
            let joined = parts
                .into_iter()
                .map(|p| match p {
                    TemplatePart::Literal(s) => s,
                    TemplatePart::Expr(s) => s,
                })
                .collect();
            Some(TokenKind::String(joined))
        }
    }

    /// Consume `{ ... }` already past the opening brace, tracking depth, and
    /// return the raw expression text (re-lexed by the parser).
    fn scan_balanced_braces(&mut self) -> String {
        let start = self.pos;
        let mut depth = 1usize;
        while let Some(ch) = self.peek() {
            match ch {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        let text: String = self.chars[start..self.pos].iter().collect();
                        self.advance();
                        return text;
                    }
                }
                _ => {}
            }
            self.advance();
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn lex_operator(&mut self) -> Option<TokenKind> {
        let start = self.pos;
        let ch = self.advance().unwrap();
        let next = self.peek();
        let kind = match (ch, next) {
            ('*', Some('*')) => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::StarStarAssign
                } else {
                    TokenKind::StarStar
                }
            }
            ('+', Some('+')) => {
                self.advance();
                TokenKind::PlusPlus
            }
            ('+', Some('=')) => {
                self.advance();
                TokenKind::PlusAssign
            }
            ('-', Some('-')) => {
                self.advance();
                TokenKind::MinusMinus
            }
            ('-', Some('=')) => {
                self.advance();
                TokenKind::MinusAssign
            }
            ('-', Some('>')) => {
                self.advance();
                TokenKind::Arrow
            }
            ('*', Some('=')) => {
                self.advance();
                TokenKind::StarAssign
            }
            ('/', Some('=')) => {
                self.advance();
                TokenKind::SlashAssign
            }
            ('%', Some('=')) => {
                self.advance();
                TokenKind::PercentAssign
            }
            ('=', Some('=')) => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::EqEqEq
                } else {
                    TokenKind::EqEq
                }
            }
            ('=', Some('>')) => {
                self.advance();
                TokenKind::FatArrow
            }
            ('!', Some('=')) => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::NotEqEq
                } else {
                    TokenKind::NotEq
                }
            }
            ('<', Some('<')) => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::LtLtAssign
                } else {
                    TokenKind::LtLt
                }
            }
            ('<', Some('=')) => {
                self.advance();
                TokenKind::LtEq
            }
            ('>', Some('>')) => {
                self.advance();
                if self.peek() == Some('>') {
                    self.advance();
                    TokenKind::GtGtGt
                } else if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::GtGtAssign
                } else {
                    TokenKind::GtGt
                }
            }
            ('>', Some('=')) => {
                self.advance();
                TokenKind::GtEq
            }
            ('&', Some('&')) => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::AmpAmpAssign
                } else {
                    TokenKind::AmpAmp
                }
            }
            ('|', Some('|')) => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::PipePipeAssign
                } else {
                    TokenKind::PipePipe
                }
            }
            ('|', Some('>')) => {
                self.advance();
                TokenKind::Pipeline
            }
            ('?', Some('?')) => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::QuestionQuestionAssign
                } else {
                    TokenKind::QuestionQuestion
                }
            }
            ('?', Some('.')) => {
                self.advance();
                TokenKind::QuestionDot
            }
            ('.', Some('.')) if self.peek_at(1) == Some('.') => {
                self.advance();
                self.advance();
                TokenKind::DotDotDot
            }
            ('+', _) => TokenKind::Plus,
            ('-', _) => TokenKind::Minus,
            ('*', _) => TokenKind::Star,
            ('/', _) => TokenKind::Slash,
            ('%', _) => TokenKind::Percent,
            ('~', _) => TokenKind::Tilde,
            ('^', _) => TokenKind::Caret,
            ('=', _) => TokenKind::Assign,
            ('<', _) => TokenKind::Lt,
            ('>', _) => TokenKind::Gt,
            ('!', _) => TokenKind::Bang,
            ('?', _) => TokenKind::Question,
            ('.', _) => TokenKind::Dot,
            (',', _) => TokenKind::Comma,
            (':', _) => TokenKind::Colon,
            (';', _) => TokenKind::Semicolon,
            ('(', _) => TokenKind::LParen,
            (')', _) => TokenKind::RParen,
            ('{', _) => TokenKind::LBrace,
            ('}', _) => TokenKind::RBrace,
            ('[', _) => TokenKind::LBracket,
            (']', _) => TokenKind::RBracket,
            ('@', _) => TokenKind::At,
            ('&', _) => TokenKind::Amp,
            ('|', _) => TokenKind::Pipe,
            (other, _) => {
                self.error(
                    format!("unexpected character '{other}'"),
                    start,
                    DiagnosticCode::LexUnexpectedChar,
                );
                return None;
            }
        };
        Some(kind)
    }
}

fn unescape(ch: char) -> char {
    match ch {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        '0' => '\0',
        other => other,
    }
}

pub fn tokenize(source: &str, file_url: &str) -> (Vec<Token>, Vec<Diagnostic>) {
    Lexer::new(source, file_url).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let (tokens, diags) = tokenize(source, "test.ntl");
        assert!(diags.is_empty(), "unexpected diagnostics: {diags:?}");
        tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_keywords_and_identifiers() {
        let k = kinds("val count = 1");
        assert_eq!(
            k,
            vec![
                TokenKind::Keyword(Keyword::Val),
                TokenKind::Identifier("count".into()),
                TokenKind::Assign,
                TokenKind::Number(1.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_hex_and_bigint() {
        let k = kinds("0xFF 10n");
        assert_eq!(
            k,
            vec![
                TokenKind::Number(255.0),
                TokenKind::BigInt("10".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_template_interpolation() {
        let k = kinds("`hi ${name}!`");
        match &k[0] {
            TokenKind::Template(parts) => {
                assert_eq!(parts.len(), 3);
                assert_eq!(parts[0], TemplatePart::Literal("hi ".into()));
                assert_eq!(parts[1], TemplatePart::Expr("name".into()));
                assert_eq!(parts[2], TemplatePart::Literal("!".into()));
            }
            other => panic!("expected template, got {other:?}"),
        }
    }

    #[test]
    fn reports_unterminated_string() {
        let (_, diags) = tokenize("val s = \"oops", "test.ntl");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, Some(DiagnosticCode::LexUnterminated));
    }

    #[test]
    fn skips_comments() {
        let k = kinds("// comment\nval x = 1 # trailing\n");
        assert_eq!(
            k,
            vec![
                TokenKind::Keyword(Keyword::Val),
                TokenKind::Identifier("x".into()),
                TokenKind::Assign,
                TokenKind::Number(1.0),
                TokenKind::Eof,
            ]
        );
    }
}
