//! Line/column coordinates for diagnostics.

use std::fmt;

/// A zero-based line and byte column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Rendered one-based, the way editors show it.
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// Start and end positions of a range, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn from_coords(start_line: usize, start_col: usize, end_line: usize, end_col: usize) -> Self {
        Self::new(Position::new(start_line, start_col), Position::new(end_line, end_col))
    }

    pub fn contains(&self, position: Position) -> bool {
        (self.start..=self.end).contains(&position)
    }

    pub fn is_single_line(&self) -> bool {
        self.start.line == self.end.line
    }
}
