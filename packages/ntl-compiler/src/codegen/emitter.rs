//! A line-buffer with an indent counter, shared by every statement-emitting
//! method in `Codegen`. Lines are written whole; nested blocks wrap their
//! emission in `indented` so the closing brace lines back up automatically.

pub struct Emitter {
    lines: Vec<String>,
    indent: usize,
    pending_export: bool,
}

impl Emitter {
    pub fn new() -> Self {
        Emitter { lines: Vec::new(), indent: 0, pending_export: false }
    }

    pub fn line(&mut self, text: &str) {
        let prefix = if self.pending_export {
            self.pending_export = false;
            "export "
        } else {
            ""
        };
        let pad = "  ".repeat(self.indent);
        self.lines.push(format!("{pad}{prefix}{text}"));
    }

    /// Alias for `line`, used from inside an `indented` closure where the
    /// receiver is a bare `&mut Emitter` rather than a `Codegen`.
    pub fn push_line(&mut self, text: &str) {
        self.line(text);
    }

    pub fn indented<F: FnOnce(&mut Emitter)>(&mut self, f: F) {
        self.indent += 1;
        f(self);
        self.indent -= 1;
    }

    pub fn bump_indent(&mut self) {
        self.indent += 1;
    }

    pub fn drop_indent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    pub fn push_export_prefix(&mut self) {
        self.pending_export = true;
    }

    pub fn pop_export_prefix(&mut self) {
        self.pending_export = false;
    }

    pub fn finish(self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}
