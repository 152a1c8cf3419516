//! Source location tracking for the Fifth lexer
//!
//! This module provides types for tracking positions and spans in source
//! text during scanning. Accurate location tracking is essential for
//! providing helpful error messages.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in source text with line, column, and byte offset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    /// Byte offset from start of input (0-based)
    pub offset: usize,
    /// Line number (1-based)
    pub line: u32,
    /// Column number (1-based)
    pub column: u32,
}

impl Position {
    /// Create a new position
    pub fn new(offset: usize, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// Create the starting position (offset 0, line 1, column 1)
    pub fn start() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A span of source text from start to end position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start position (inclusive)
    pub start: Position,
    /// End position (exclusive)
    pub end: Position,
}

impl Span {
    /// Create a new span
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(
            start.offset <= end.offset,
            "Span start must not be after end"
        );
        Self { start, end }
    }

    /// Get the start position of this span
    pub fn start(&self) -> Position {
        self.start
    }

    /// Get the end position of this span
    pub fn end(&self) -> Position {
        self.end
    }

    /// Create a single-character span
    pub fn single(pos: Position) -> Self {
        let end = Position {
            offset: pos.offset + 1,
            line: pos.line,
            column: pos.column + 1,
        };
        Self { start: pos, end }
    }

    /// Get the byte length of this span
    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    /// Check if this span is empty
    pub fn is_empty(&self) -> bool {
        self.start.offset == self.end.offset
    }

    /// Get the source text for this span from the input
    pub fn slice<'a>(&self, input: &'a [u8]) -> &'a [u8] {
        &input[self.start.offset..self.end.offset.min(input.len())]
    }

    /// Create an unknown/dummy span (useful for generated records)
    pub fn dummy() -> Self {
        Self {
            start: Position::start(),
            end: Position::start(),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(
                f,
                "{}:{}-{}",
                self.start.line, self.start.column, self.end.column
            )
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// A source map that tracks line starts for efficient position lookup.
///
/// Recognizes LF, CR, and CR+LF line endings, matching the scanner's line
/// counting policy, so a line number reported by the scanner addresses the
/// same text here.
#[derive(Debug, Clone)]
pub struct SourceMap {
    /// The source text (lossy-decoded where the input was not UTF-8)
    pub source: String,
    /// Byte offsets of line starts
    line_starts: Vec<usize>,
}

impl SourceMap {
    /// Create a new source map from raw source bytes
    pub fn new(source: &[u8]) -> Self {
        let source = String::from_utf8_lossy(source).into_owned();
        let mut line_starts = vec![0];
        let bytes = source.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => line_starts.push(i + 1),
                b'\r' => {
                    if bytes.get(i + 1) == Some(&b'\n') {
                        i += 1;
                    }
                    line_starts.push(i + 1);
                }
                _ => {}
            }
            i += 1;
        }
        Self {
            source,
            line_starts,
        }
    }

    /// Get a line of text by line number (1-based)
    pub fn get_line(&self, line_num: u32) -> Option<&str> {
        if line_num == 0 {
            return None;
        }

        let line_idx = (line_num - 1) as usize;
        if line_idx >= self.line_starts.len() {
            return None;
        }

        let start = self.line_starts[line_idx];
        let end = if line_idx + 1 < self.line_starts.len() {
            self.line_starts[line_idx + 1]
        } else {
            self.source.len()
        };

        Some(self.source[start..end].trim_end_matches(['\n', '\r']))
    }

    /// Number of lines in the source
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Format an error message with source context
    pub fn format_error(&self, span: &Span, message: &str) -> String {
        let mut result = String::new();

        result.push_str(&format!("Error: {}\n", message));
        result.push_str(&format!(
            "  --> {}:{}\n",
            span.start.line, span.start.column
        ));

        if let Some(line) = self.get_line(span.start.line) {
            let line_num_str = format!("{}", span.start.line);
            let padding = " ".repeat(line_num_str.len());

            result.push_str(&format!("{} |\n", padding));
            result.push_str(&format!("{} | {}\n", line_num_str, line));

            let mut underline = String::new();
            underline.push_str(&format!("{} | ", padding));

            for _ in 1..span.start.column {
                underline.push(' ');
            }

            let span_len = if span.start.line == span.end.line && span.end.column > span.start.column
            {
                (span.end.column - span.start.column) as usize
            } else {
                1
            };

            for _ in 0..span_len.max(1) {
                underline.push('^');
            }

            result.push_str(&underline);
            result.push('\n');
        }

        result
    }
}
