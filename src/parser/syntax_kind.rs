//! Syntax kinds for the rowan-based CST
//!
//! Kinds are dense symbol indices assigned by the grammar compiler: terminals
//! first, then non-terminals. A handful of low indices are reserved and are
//! the same for every grammar.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A grammar symbol index, used both by the parse tables and as the rowan kind
/// of tree elements.
///
/// Missing elements (zero-width placeholders inserted by error recovery) carry
/// the kind of the absent symbol with [`SyntaxKind::MISSING_BIT`] set.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SyntaxKind(pub u16);

impl SyntaxKind {
    /// End of input
    pub const END: Self = Self(0);
    /// Error nodes built by recovery, and unscannable input
    pub const ERROR: Self = Self(1);
    /// The grammar's catch-all `error` symbol
    pub const ERROR_SYMBOL: Self = Self(2);

    pub const MISSING_BIT: u16 = 0x8000;

    /// Number of reserved terminal kinds
    pub const RESERVED: u16 = 3;

    /// Largest kind a grammar may allocate
    pub const MAX: u16 = Self::MISSING_BIT - 1;

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn is_missing(self) -> bool {
        self.0 & Self::MISSING_BIT != 0
    }

    /// The missing-placeholder kind for this symbol.
    pub fn missing(self) -> Self {
        Self(self.0 | Self::MISSING_BIT)
    }

    /// The symbol kind with the missing flag cleared.
    pub fn symbol(self) -> Self {
        Self(self.0 & !Self::MISSING_BIT)
    }

    pub fn is_error(self) -> bool {
        self == Self::ERROR
    }

    pub fn is_reserved(self) -> bool {
        self.0 < Self::RESERVED
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_missing() {
            write!(f, "MISSING({})", self.symbol().0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl From<u16> for SyntaxKind {
    fn from(raw: u16) -> Self {
        Self(raw)
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind.0)
    }
}

impl From<rowan::SyntaxKind> for SyntaxKind {
    fn from(raw: rowan::SyntaxKind) -> Self {
        Self(raw.0)
    }
}

/// Language definition for rowan
///
/// Kinds are grammar-specific, so one rowan language serves every compiled
/// grammar; the owning [`crate::Language`] gives them names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GrammarLanguage {}

impl rowan::Language for GrammarLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        raw.into()
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type aliases for convenience
pub type SyntaxNode = rowan::SyntaxNode<GrammarLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<GrammarLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<GrammarLanguage>;

pub type GreenElement = rowan::NodeOrToken<rowan::GreenNode, rowan::GreenToken>;
