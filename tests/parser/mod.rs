//! Parser tests
//!
//! - Trees built for valid input
//! - Error recovery and diagnostics
//! - Sharing languages across threads

pub mod tests_concurrency;
pub mod tests_parse;
pub mod tests_recovery;
