//! Grammar table compiler.
//!
//! Turns a [`Grammar`] into an [`Automaton`]:
//!
//! 1. flatten EBNF rules into numbered BNF productions
//! 2. compute nullable and FIRST sets
//! 3. build LR(1) item sets (LALR(1) by default)
//! 4. emit actions, resolving conflicts by precedence, associativity,
//!    declaration order and `prefer` hints
//! 5. derive per-state lexical modes

mod conflicts;
mod error;
mod first_sets;
mod flatten;
mod item_sets;

pub use error::{CompileError, Conflict};

use tracing::debug;

use crate::automaton::{Automaton, AutomatonParts};
use crate::grammar::Grammar;

/// Options for table construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Keep canonical LR(1) states instead of merging identical cores.
    pub canonical_lr: bool,
}

/// Compile a grammar into a parse automaton.
pub fn compile(grammar: &Grammar) -> Result<Automaton, CompileError> {
    compile_with(grammar, &CompileOptions::default())
}

pub fn compile_with(grammar: &Grammar, options: &CompileOptions) -> Result<Automaton, CompileError> {
    let flat = flatten::flatten(grammar)?;
    let first = first_sets::FirstSets::compute(&flat);
    let context = item_sets::ClosureContext::new(&flat, &first);
    let sets = item_sets::build(&context, options.canonical_lr);
    let table = conflicts::build_table(&flat, &context, &sets)?;

    debug!(
        grammar = %flat.name,
        symbols = flat.symbols.len(),
        terminals = flat.terminal_count,
        productions = flat.productions.len(),
        states = table.state_count(),
        canonical = options.canonical_lr,
        "compiled grammar"
    );

    Ok(Automaton::from_parts(AutomatonParts {
        name: flat.name,
        symbols: flat.symbols,
        terminal_count: flat.terminal_count,
        productions: flat.productions,
        table,
        matchers: flat.matchers,
        start: flat.start,
    }))
}

/// Parse a textual grammar description and compile it.
pub fn compile_str(source: &str) -> Result<Automaton, CompileError> {
    let grammar: Grammar = source.parse()?;
    compile(&grammar)
}
