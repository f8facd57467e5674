//! Polytope grammar tests over the `.poly` fixtures.

pub mod tests_ast;
pub mod tests_programs;
