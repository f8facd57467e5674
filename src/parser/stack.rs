//! Parser stack entries.

use rowan::NodeOrToken;
use text_size::TextSize;

use super::syntax_kind::GreenElement;
use crate::automaton::StateId;

pub(crate) fn element_len(element: &GreenElement) -> TextSize {
    match element {
        NodeOrToken::Node(node) => node.text_len(),
        NodeOrToken::Token(token) => token.text_len(),
    }
}

pub(crate) fn elements_len(elements: &[GreenElement]) -> TextSize {
    elements.iter().map(element_len).sum()
}

/// One automaton state plus the tree built for it.
#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub state: StateId,
    /// Extras (and error nodes) between the previous entry and `element`
    pub leading: Vec<GreenElement>,
    /// `None` for the bottom entry and for states replayed by the incremental
    /// parser, which carry no tree
    pub element: Option<GreenElement>,
    /// Start of `element`; for entries without one, the end of the text the
    /// stack below covers
    pub offset: TextSize,
}

impl Entry {
    pub fn bare(state: StateId, offset: TextSize) -> Self {
        Self {
            state,
            leading: Vec::new(),
            element: None,
            offset,
        }
    }

    pub fn end(&self) -> TextSize {
        self.offset + self.element.as_ref().map_or(TextSize::new(0), element_len)
    }

    pub fn start(&self) -> TextSize {
        self.offset - elements_len(&self.leading)
    }

    /// Leading trivia followed by the element.
    pub fn into_elements(self) -> impl Iterator<Item = GreenElement> {
        self.leading.into_iter().chain(self.element)
    }
}
