//! Subtrees of a previous tree that can be shared by a new parse.

use rowan::{GreenNode, GreenNodeData, GreenToken, GreenTokenData, NodeOrToken, WalkEvent};
use rustc_hash::FxHashMap;
use std::ptr;
use text_size::TextSize;

use super::Edit;
use crate::parser::{GreenElement, SyntaxKind, SyntaxNode, element_len};

/// Prior tokens and nodes indexed by where they land in the new text.
///
/// Elements overlapping the edit are left out. A token is reused when a new
/// token of the same kind and text starts at its shifted position; a node
/// when a new node of the same kind is built there from exactly the same
/// (shared) children, so reuse propagates bottom-up from reused tokens.
#[derive(Debug, Default)]
pub struct ReusePool {
    tokens: FxHashMap<(TextSize, SyntaxKind), GreenToken>,
    nodes: FxHashMap<(TextSize, SyntaxKind, TextSize), Vec<GreenNode>>,
}

impl ReusePool {
    /// Pool the elements of `node`'s subtree; the tree root itself is never
    /// pooled.
    pub fn new(node: &SyntaxNode, edit: &Edit) -> Self {
        let mut pool = Self::default();
        for event in node.preorder_with_tokens() {
            let WalkEvent::Enter(element) = event else {
                continue;
            };
            let kind = SyntaxKind::from(element.kind());
            if kind.is_missing() || kind == SyntaxKind::ERROR || element.parent().is_none() {
                continue;
            }
            let Some(range) = edit.map_range(element.text_range()) else {
                continue;
            };
            match element {
                NodeOrToken::Token(token) => {
                    pool.tokens
                        .insert((range.start(), kind), token.green().to_owned());
                }
                NodeOrToken::Node(node) => {
                    pool.nodes
                        .entry((range.start(), kind, range.len()))
                        .or_default()
                        .push(node.green().into_owned());
                }
            }
        }
        pool
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.values().map(Vec::len).sum()
    }

    pub(crate) fn token(&self, offset: TextSize, kind: SyntaxKind, text: &str) -> Option<GreenToken> {
        self.tokens
            .get(&(offset, kind))
            .filter(|token| token.text() == text)
            .cloned()
    }

    pub(crate) fn node(&self, offset: TextSize, kind: SyntaxKind, children: &[GreenElement]) -> Option<GreenNode> {
        let len = children.iter().map(element_len).sum();
        self.nodes
            .get(&(offset, kind, len))?
            .iter()
            .find(|candidate| same_children(candidate, children))
            .cloned()
    }
}

fn same_children(candidate: &GreenNodeData, children: &[GreenElement]) -> bool {
    candidate.children().len() == children.len()
        && candidate.children().zip(children).all(|pair| match pair {
            (NodeOrToken::Node(old), NodeOrToken::Node(new)) => {
                ptr::eq(old, &**new as &GreenNodeData)
            }
            (NodeOrToken::Token(old), NodeOrToken::Token(new)) => {
                ptr::eq(old, &**new as &GreenTokenData)
            }
            _ => false,
        })
}
