//! Syntax error records
//!
//! Errors are not raised while parsing; they are read back from the error
//! and missing elements recovery left in the tree.

use rowan::TextRange;
use std::fmt;

use crate::base::{LineIndex, Span};

use super::codes::ErrorCode;

/// A source range that explains an error, e.g. the token a missing one was
/// expected after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedInfo {
    pub message: String,
    pub range: TextRange,
}

impl RelatedInfo {
    pub fn new(message: impl Into<String>, range: TextRange) -> Self {
        Self {
            message: message.into(),
            range,
        }
    }
}

/// One diagnostic derived from a recovered tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    /// Empty for missing elements, positioned where they were expected
    pub range: TextRange,
    pub code: ErrorCode,
    /// Suggested fix
    pub hint: Option<String>,
    pub related: Vec<RelatedInfo>,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, range: TextRange, code: ErrorCode) -> Self {
        Self {
            message: message.into(),
            range,
            code,
            hint: None,
            related: Vec::new(),
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_related(mut self, info: RelatedInfo) -> Self {
        self.related.push(info);
        self
    }

    /// `CODE: message`, with the hint on a second line.
    pub fn format(&self) -> String {
        let mut result = format!("{}: {}", self.code, self.message);
        if let Some(hint) = &self.hint {
            result.push_str(&format!("\n  hint: {hint}"));
        }
        result
    }

    /// Format with a 1-based `line:col` prefix resolved against `index`.
    pub fn format_at(&self, index: &LineIndex) -> String {
        format!("{}: {}", index.position(self.range.start()), self.format())
    }

    /// Line/column span of the error range.
    pub fn span(&self, index: &LineIndex) -> Span {
        index.span(self.range)
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {:?}: {}", self.code, self.range, self.message)
    }
}
