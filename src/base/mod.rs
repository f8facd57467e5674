//! Foundation types for the parser engine.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`TextRange`], [`TextSize`] - Source positions (byte offsets)
//! - [`LineCol`], [`LineIndex`] - Lazy line/column conversion
//! - [`Position`], [`Span`] - Line/column ranges for diagnostics
//!
//! This module has NO dependencies on other modules of the crate.

mod line_index;
mod position;

pub use line_index::{LineCol, LineIndex};
pub use position::{Position, Span};

pub use text_size::{TextRange, TextSize};

// Re-export text-size for convenience
pub use text_size;
