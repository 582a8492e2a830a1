//! The diagnostic engine (spec §4.1).
//!
//! A `Diagnostic` is plain data — never a Rust `Result` error — threaded
//! through the pipeline and collected into `CompileResult` independently of
//! `Result`. Rendering adds a source excerpt, an underline caret, numbered
//! suggestions, similar-name hints and an optional bad/good example pair.

pub mod span;
pub mod similar;

use std::io::IsTerminal;

pub use similar::{find_similar, Candidate};
pub use span::{LineIndex, SourceFile, SourceLocation};

/// The pipeline stage that raised a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Lex,
    Parse,
    Scope,
    Type,
    Compile,
    Runtime,
    Resolve,
    Macro,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Lex => "lex",
            Phase::Parse => "parse",
            Phase::Scope => "scope",
            Phase::Type => "type",
            Phase::Compile => "compile",
            Phase::Runtime => "runtime",
            Phase::Resolve => "resolve",
            Phase::Macro => "macro",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// The closed diagnostic code catalogue (spec §4.1/§7, extended by
/// SPEC_FULL.md §C to cover every taxonomy entry with a concrete tag).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticCode {
    LexUnterminated,
    LexUnexpectedChar,
    ParseUnexpectedToken,
    ParseMissingToken,
    ParseUnterminated,
    UndefVar,
    UndefFunc,
    ConstReassign,
    DuplicateParam,
    TypeMismatch,
    TypeMismatchWarn,
    NotFunction,
    NullAccess,
    CodegenFatal,
    UnknownModule,
    ChainedAssign,
    DivByZero,
    TryNoHandler,
    TooManyParams,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::LexUnterminated => "LEX_UNTERMINATED",
            DiagnosticCode::LexUnexpectedChar => "LEX_UNEXPECTED_CHAR",
            DiagnosticCode::ParseUnexpectedToken => "PARSE_UNEXPECTED_TOKEN",
            DiagnosticCode::ParseMissingToken => "PARSE_MISSING_TOKEN",
            DiagnosticCode::ParseUnterminated => "PARSE_UNTERMINATED",
            DiagnosticCode::UndefVar => "UNDEF_VAR",
            DiagnosticCode::UndefFunc => "UNDEF_FUNC",
            DiagnosticCode::ConstReassign => "CONST_REASSIGN",
            DiagnosticCode::DuplicateParam => "DUPLICATE_PARAM",
            DiagnosticCode::TypeMismatch => "TYPE_MISMATCH",
            DiagnosticCode::TypeMismatchWarn => "TYPE_MISMATCH_WARN",
            DiagnosticCode::NotFunction => "NOT_FUNCTION",
            DiagnosticCode::NullAccess => "NULL_ACCESS",
            DiagnosticCode::CodegenFatal => "CODEGEN_FATAL",
            DiagnosticCode::UnknownModule => "UNKNOWN_MODULE",
            DiagnosticCode::ChainedAssign => "CHAINED_ASSIGN",
            DiagnosticCode::DivByZero => "DIV_BY_ZERO",
            DiagnosticCode::TryNoHandler => "TRY_NO_HANDLER",
            DiagnosticCode::TooManyParams => "TOO_MANY_PARAMS",
        }
    }
}

/// A bad/good example pair shown under a diagnostic to steer the user toward
/// the idiomatic fix (spec §4.4's `print`/`println` redirect is the
/// canonical case).
#[derive(Debug, Clone)]
pub struct Example {
    pub bad: String,
    pub good: String,
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub phase: Phase,
    pub severity: Severity,
    pub message: String,
    pub code: Option<DiagnosticCode>,
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub source_excerpt: Option<String>,
    pub similar_names: Vec<String>,
    pub suggestions: Vec<String>,
    pub example: Option<Example>,
}

impl Diagnostic {
    pub fn error(phase: Phase, message: impl Into<String>, loc: &SourceLocation) -> Self {
        Diagnostic {
            phase,
            severity: Severity::Error,
            message: message.into(),
            code: None,
            file: loc.file.url.to_string(),
            line: loc.line,
            column: loc.column,
            source_excerpt: Some(render_excerpt(loc)),
            similar_names: Vec::new(),
            suggestions: Vec::new(),
            example: None,
        }
    }

    pub fn warning(phase: Phase, message: impl Into<String>, loc: &SourceLocation) -> Self {
        let mut d = Diagnostic::error(phase, message, loc);
        d.severity = Severity::Warning;
        d
    }

    pub fn with_code(mut self, code: DiagnosticCode) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }

    pub fn with_similar_names(mut self, names: Vec<String>) -> Self {
        self.similar_names = names;
        self
    }

    pub fn with_example(mut self, bad: impl Into<String>, good: impl Into<String>) -> Self {
        self.example = Some(Example { bad: bad.into(), good: good.into() });
        self
    }

    /// Render the six-region block described by spec §7: header, location,
    /// blank, source excerpt with caret, explanation, suggestions/similar
    /// names/example.
    pub fn render(&self) -> String {
        let c = Colors::current();
        let mut out = String::new();
        let label = match self.severity {
            Severity::Error => format!("{}error[{}]{}", c.red, self.phase.label(), c.reset),
            Severity::Warning => format!("{}warning[{}]{}", c.yellow, self.phase.label(), c.reset),
        };
        let code_suffix = self.code.map(|c| format!(" {}", c.as_str())).unwrap_or_default();
        out.push_str(&format!("{label}{code_suffix}: {}\n", self.message));
        out.push_str(&format!(
            "  {}--> {}:{}:{}{}\n",
            c.cyan,
            self.file,
            self.line + 1,
            self.column + 1,
            c.reset
        ));
        if let Some(excerpt) = &self.source_excerpt {
            out.push('\n');
            out.push_str(excerpt);
            out.push('\n');
        }
        if !self.suggestions.is_empty() {
            out.push('\n');
            out.push_str(&format!("{}suggestions:{}\n", c.yellow, c.reset));
            for (i, s) in self.suggestions.iter().enumerate() {
                out.push_str(&format!("  {}. {}\n", i + 1, s));
            }
        }
        if !self.similar_names.is_empty() {
            out.push_str(&format!(
                "{}did you mean:{} {}\n",
                c.gray,
                c.reset,
                self.similar_names.join(", ")
            ));
        }
        if let Some(example) = &self.example {
            out.push('\n');
            out.push_str(&format!("  {}bad:{}  {}\n", c.red, c.reset, example.bad));
            out.push_str(&format!("  {}good:{} {}\n", c.green, c.reset, example.good));
        }
        out
    }
}

fn render_excerpt(loc: &SourceLocation) -> String {
    let c = Colors::current();
    let lines: Vec<&str> = loc.file.content.lines().collect();
    let start = loc.line.saturating_sub(2);
    let end = (loc.line + 2).min(lines.len().saturating_sub(1));
    let mut out = String::new();
    for i in start..=end {
        let Some(text) = lines.get(i) else { continue };
        out.push_str(&format!("{}{:>4} |{} {}\n", c.gray, i + 1, c.reset, text));
        if i == loc.line {
            let mut underline = " ".repeat(loc.column);
            underline.push('^');
            out.push_str(&format!("     {}{}\n", c.red, c.reset));
            out.push_str(&format!("     {}{}{}\n", c.red, underline, c.reset));
        }
    }
    out
}

struct Colors {
    red: &'static str,
    yellow: &'static str,
    cyan: &'static str,
    gray: &'static str,
    green: &'static str,
    reset: &'static str,
}

impl Colors {
    fn current() -> Self {
        let enabled = std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal();
        if enabled {
            Colors {
                red: "\x1b[31m",
                yellow: "\x1b[33m",
                cyan: "\x1b[36m",
                gray: "\x1b[90m",
                green: "\x1b[32m",
                reset: "\x1b[0m",
            }
        } else {
            Colors { red: "", yellow: "", cyan: "", gray: "", green: "", reset: "" }
        }
    }
}

/// Rewrite a host JavaScript engine's error text into an NTL-shaped message
/// (spec §4.1's translation layer, used by `run` to present runtime errors as
/// ordinary diagnostics rather than raw Node stack traces).
pub fn translate_host_error(message: &str) -> String {
    if message.starts_with("TypeError: Cannot read propert") {
        return format!(
            "cannot access property — value is null or undefined (original: {message})"
        );
    }
    if message.contains("is not a function") {
        return format!("{message} — check that this name refers to a callable value");
    }
    if message.contains("is not defined") {
        return format!("{message} — this name is not declared in any enclosing scope");
    }
    if message.contains("Maximum call stack size exceeded") {
        return "stack overflow — check for unbounded recursion".to_string();
    }
    if message.contains("Assignment to constant variable") {
        return "cannot reassign a `val` binding after it is declared".to_string();
    }
    if message.contains("has already been declared") {
        return format!("{message} — duplicate declaration in the same scope");
    }
    message.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(content: &str, offset: usize) -> SourceLocation {
        let file = SourceFile::new(content, "test.ntl");
        LineIndex::new(content).location(&file, offset)
    }

    #[test]
    fn render_includes_phase_and_location() {
        let l = loc("fn f() { return x }", 17);
        let d = Diagnostic::error(Phase::Scope, "undeclared identifier 'x'", &l)
            .with_code(DiagnosticCode::UndefVar);
        let rendered = d.render();
        assert!(rendered.contains("scope"));
        assert!(rendered.contains("UNDEF_VAR"));
        assert!(rendered.contains("test.ntl:1:18"));
    }

    #[test]
    fn translate_not_defined() {
        let translated = translate_host_error("x is not defined");
        assert!(translated.contains("not declared"));
    }
}
