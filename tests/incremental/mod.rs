//! Incremental re-parsing tests
//!
//! Every re-parse is checked against a full parse of the edited text.

pub mod tests_edits;
pub mod tests_reuse;
