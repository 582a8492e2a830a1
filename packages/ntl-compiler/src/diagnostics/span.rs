//! Source locations and spans.
//!
//! A location carries its own file content so a diagnostic can slice out a
//! source excerpt without re-reading the file from disk.

use std::fmt;
use std::rc::Rc;

/// A source file held in memory for the duration of a single compile.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub content: Rc<str>,
    pub url: Rc<str>,
}

impl SourceFile {
    pub fn new(content: impl Into<String>, url: impl Into<String>) -> Self {
        SourceFile {
            content: Rc::from(content.into()),
            url: Rc::from(url.into()),
        }
    }

    pub fn lines(&self) -> std::str::Lines<'_> {
        self.content.lines()
    }
}

/// A single point in a source file.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceLocation {
    pub file: SourceFile,
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(file: SourceFile, offset: usize, line: usize, column: usize) -> Self {
        SourceLocation { file, offset, line, column }
    }

    /// The source line this location sits on, without its trailing newline.
    pub fn line_text(&self) -> &str {
        self.file.lines().nth(self.line).unwrap_or("")
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file.url, self.line + 1, self.column + 1)
    }
}

/// A range between two locations in the same file.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSpan {
    pub start: SourceLocation,
    pub end: SourceLocation,
}

impl SourceSpan {
    pub fn new(start: SourceLocation, end: SourceLocation) -> Self {
        SourceSpan { start, end }
    }

    pub fn text(&self) -> &str {
        &self.start.file.content[self.start.offset..self.end.offset]
    }
}

/// Tracks line/column while scanning a source file left to right, mirroring
/// the cursor the lexer advances over. Shared by the lexer (to stamp tokens)
/// and the driver (to build a `SourceFile` for diagnostics).
pub struct LineIndex {
    /// Byte offset of the start of each line.
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(content: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, ch) in content.char_indices() {
            if ch == '\n' {
                line_starts.push(i + 1);
            }
        }
        LineIndex { line_starts }
    }

    /// Convert a byte offset into a zero-based (line, column) pair.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert_at) => insert_at.saturating_sub(1),
        };
        let col = offset - self.line_starts[line];
        (line, col)
    }

    pub fn location(&self, file: &SourceFile, offset: usize) -> SourceLocation {
        let (line, column) = self.line_col(offset);
        SourceLocation::new(file.clone(), offset, line, column)
    }

    /// Reverse of `line_col`: recover a byte offset from a (line, column)
    /// pair already stamped onto an AST node.
    pub fn line_col_to_offset(&self, line: usize, column: usize) -> usize {
        self.line_starts.get(line).copied().unwrap_or(0) + column
    }

    pub fn location_at(&self, file: &SourceFile, line: usize, column: usize) -> SourceLocation {
        let offset = self.line_col_to_offset(line, column);
        SourceLocation::new(file.clone(), offset, line, column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_col_tracks_newlines() {
        let idx = LineIndex::new("val a = 1\nval b = 2\n");
        assert_eq!(idx.line_col(0), (0, 0));
        assert_eq!(idx.line_col(10), (1, 0));
        assert_eq!(idx.line_col(14), (1, 4));
    }
}
