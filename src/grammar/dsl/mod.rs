//! Textual grammar description language.
//!
//! ```text
//! grammar arith;
//! start expr;
//! extras ws;
//! token ws = /\s+/;
//! token number = /[0-9]+/;
//! expr = @left(1) expr "+" expr
//!      | number;
//! ```
//!
//! Directives (`grammar`, `start`, `extras`, `token`, `prefer`) are contextual
//! keywords: an identifier directly followed by `=` always starts a rule.

mod lexer;
mod parser;

use thiserror::Error;

use super::Grammar;
use crate::base::{LineCol, LineIndex};

/// A syntax error in a grammar description, with a 1-based location.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{line}:{col}: {message}")]
pub struct GrammarError {
    pub message: String,
    pub line: u32,
    pub col: u32,
}

impl GrammarError {
    pub(crate) fn at(index: &LineIndex, offset: text_size::TextSize, message: String) -> Self {
        let LineCol { line, col } = index.line_col(offset);
        Self {
            message,
            line: line + 1,
            col: col + 1,
        }
    }
}

/// Parse a grammar description.
pub fn parse(source: &str) -> Result<Grammar, GrammarError> {
    parser::DslParser::new(source).parse()
}
