//! Rowan-based LR parser runtime
//!
//! This module turns source text into a lossless green tree using:
//! - a contextual **lexer** driven by the automaton's token matchers
//! - a table-driven **LR engine** with cost-based error recovery
//! - **rowan** for the CST (Concrete Syntax Tree)
//!
//! ## Architecture
//!
//! ```text
//! Source Text
//!     ↓
//! Lexer (valid terminals of the current state) → Tokens with SyntaxKind
//!     ↓
//! Engine (shift / reduce / recover) → GreenNode tree (immutable, cheap to clone)
//!     ↓
//! SyntaxNode (rowan) → CST with parent pointers
//!     ↓
//! Node view → hidden rules flattened, fields resolved
//! ```
//!
//! Every token, extras included, ends up in the tree, so the root's text is
//! always exactly the input.

pub mod errors;
mod lexer;
#[allow(clippy::module_inception)]
mod parser;
mod recovery;
mod stack;
mod syntax_kind;

pub use errors::{ErrorCode, RelatedInfo, SyntaxError};
pub use lexer::{Lexer, Token, tokenize};
pub use parser::{Parse, ParseOptions, ParseStats, parse, parse_with};
pub use recovery::RecoveryOptions;
pub use syntax_kind::{
    GrammarLanguage, GreenElement, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken,
};

pub(crate) use parser::{Engine, Outcome, Window, parse_green};
pub(crate) use stack::element_len;

/// Re-export rowan types for convenience
pub use rowan::{GreenNode, TextRange, TextSize};
