//! # polytope-parser
//!
//! Grammar-driven incremental LR parsing, and the Polytope language built on it.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! polytope     → Built-in Polytope grammar and typed AST
//!   ↓
//! incremental  → Edits, subtree reuse, windowed re-parsing
//!   ↓
//! syntax       → Node view: hidden rules flattened, fields, s-expressions
//!   ↓
//! parser       → Contextual lexer, LR engine, error recovery, diagnostics
//!   ↓
//! language     → Compiled grammars, process-wide cache
//!   ↓
//! compile      → LR(1)/LALR(1) table construction, conflict resolution
//!   ↓
//! automaton    → Parse tables, symbol metadata, persistence
//!   ↓
//! grammar      → Grammar model and the grammar description language
//!   ↓
//! base         → Primitives (TextRange, LineIndex, Position)
//! ```
//!
//! ## Quick start
//!
//! ```ignore
//! use polytope::{Edit, Language, parse, reparse};
//!
//! let language = Language::from_source(r#"
//!     grammar sum;
//!     start expr;
//!     extras ws;
//!     token ws = /\s+/;
//!     token num = /[0-9]+/;
//!     expr = @left(1) expr "+" expr | num;
//! "#)?;
//!
//! let first = parse("1 + 2", &language);
//! assert!(first.ok());
//!
//! let edit = Edit::insert(5.into(), "3");
//! let second = reparse(&first, &edit, "1 + 23", &language);
//! assert_eq!(second.root().to_sexp(), first.root().to_sexp());
//! ```

// ============================================================================
// MODULES (dependency order: base → grammar → automaton → compile → parser → ...)
// ============================================================================

/// Foundation types: TextRange, LineIndex, Position
pub mod base;

/// Grammar model and the textual grammar description language
pub mod grammar;

/// Compiled parse tables and symbol metadata
pub mod automaton;

/// Grammar compiler: flattening, item sets, conflict resolution
pub mod compile;

/// Parser: contextual lexer, LR engine, recovery, diagnostics
pub mod parser;

/// Public tree view over parse results
pub mod syntax;

/// Incremental re-parsing
pub mod incremental;

/// Compiled languages and the grammar cache
pub mod language;

/// The Polytope grammar and typed AST
pub mod polytope;

// Re-export the entry points
pub use automaton::{Automaton, LoadError};
pub use compile::{CompileError, CompileOptions, Conflict, compile, compile_str, compile_with};
pub use grammar::{Grammar, GrammarError, Rule};
pub use incremental::{Edit, EditError, IncrementalOptions, reparse, reparse_with};
pub use language::{GrammarCache, Language};
pub use parser::{
    ErrorCode, Parse, ParseOptions, ParseStats, RecoveryOptions, SyntaxError, SyntaxKind,
    parse, parse_with,
};
pub use syntax::Node;

// Re-export foundation types
pub use base::{LineCol, LineIndex, Position, Span, TextRange, TextSize};
