//! Public view of parsed trees
//!
//! The green tree keeps every grammar symbol, including hidden rules and
//! repetition helpers, because incremental re-parsing replays parser states
//! from it. [`Node`] presents the tree the way the grammar author wrote it:
//! hidden nodes are flattened into their parents and field names are
//! recovered from the production each node was reduced by.

mod node;

pub use node::{Node, Preorder};
