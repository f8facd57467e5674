//! Parser error handling module
//!
//! Parsing never fails. Recovery leaves `ERROR` nodes, `error` nodes and
//! zero-width missing elements in the tree; this module turns them into
//! diagnostics:
//! - Categorized error codes for filtering and documentation
//! - Hints for the common fixes
//! - Related spans (e.g. the token a missing one was expected after)

mod codes;
mod collect;
mod error;

pub use codes::ErrorCode;
pub use collect::collect_errors;
pub use error::{RelatedInfo, SyntaxError};

#[cfg(test)]
mod tests;
