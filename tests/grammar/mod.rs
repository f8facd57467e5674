//! Grammar compilation tests
//!
//! - Grammar descriptions accepted and rejected by the compiler
//! - LALR and canonical tables parsing alike
//! - Saving and loading compiled automata

pub mod tests_compile;
pub mod tests_persistence;
