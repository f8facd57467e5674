//! Line/column lookup for byte offsets.
//!
//! Tokens and nodes only store byte offsets; line and column are derived on
//! demand through a [`LineIndex`] built once per source text.

use super::position::{Position, Span};
use text_size::{TextRange, TextSize};

/// A zero-based line/column pair. Columns are byte offsets within the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

/// Maps byte offsets to line/column pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    /// Offset of the first byte of every line; always starts with 0.
    line_starts: Vec<TextSize>,
    len: TextSize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::new(0)];
        for (offset, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(TextSize::new(offset as u32 + 1));
            }
        }
        Self {
            line_starts,
            len: TextSize::of(text),
        }
    }

    /// Number of lines (a trailing newline opens a final empty line).
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Line/column of `offset`. Offsets past the end clamp to the end.
    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let offset = offset.min(self.len);
        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        LineCol {
            line: line as u32,
            col: u32::from(offset - self.line_starts[line]),
        }
    }

    /// Byte offset of a line/column pair, if it lies inside the text.
    pub fn offset(&self, line_col: LineCol) -> Option<TextSize> {
        let start = *self.line_starts.get(line_col.line as usize)?;
        let end = self
            .line_starts
            .get(line_col.line as usize + 1)
            .copied()
            .unwrap_or(self.len);
        let offset = start + TextSize::new(line_col.col);
        (offset <= end).then_some(offset)
    }

    pub fn position(&self, offset: TextSize) -> Position {
        let LineCol { line, col } = self.line_col(offset);
        Position::new(line as usize, col as usize)
    }

    pub fn span(&self, range: TextRange) -> Span {
        Span::new(self.position(range.start()), self.position(range.end()))
    }
}
