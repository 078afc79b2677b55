//! Source positions and spans.
//!
//! Positions follow the postcss convention: byte offsets, 1-based lines,
//! 1-based character columns. A [`Span`] end points at the node's *last*
//! character (inclusive), so the text a span covers is
//! `&source[span.start.offset..=span.end.offset]`.

use memchr::memchr_iter;
use serde::{Deserialize, Serialize};

/// A position in source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    /// Byte offset from the start of the text
    pub offset: usize,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based, in characters not bytes)
    pub column: usize,
}

/// A span from a start position to an end position (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    /// The text this span covers in `source`.
    ///
    /// Returns an empty string if the span is out of bounds.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        source
            .get(self.start.offset..self.end.offset + 1)
            .unwrap_or("")
    }
}

/// Newline index over a text, for fast offset-to-position lookups.
///
/// Scans the text once to collect line-break offsets, then answers
/// `offset → (line, column)` queries in O(log n) via binary search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineIndex {
    line_breaks: Vec<usize>,
    total_length: usize,
}

impl LineIndex {
    pub fn new(content: &str) -> Self {
        LineIndex {
            line_breaks: memchr_iter(b'\n', content.as_bytes()).collect(),
            total_length: content.len(),
        }
    }

    /// Number of lines in the indexed text (a trailing newline does not
    /// open a new line; empty text has one line).
    pub fn line_count(&self) -> usize {
        match self.line_breaks.last() {
            Some(&last) if last + 1 == self.total_length => self.line_breaks.len(),
            _ => self.line_breaks.len() + 1,
        }
    }

    /// Convert a byte offset into a [`Position`] within `content`.
    ///
    /// `content` must be the text the index was built from. Returns `None`
    /// if the offset is past the end of the text.
    pub fn position(&self, content: &str, offset: usize) -> Option<Position> {
        if offset > self.total_length {
            return None;
        }

        let row = match self.line_breaks.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx,
        };
        let line_start = if row == 0 {
            0
        } else {
            self.line_breaks[row - 1] + 1
        };
        let column = content[line_start..offset].chars().count() + 1;

        Some(Position {
            offset,
            line: row + 1,
            column,
        })
    }
}
