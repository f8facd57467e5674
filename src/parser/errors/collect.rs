//! Deriving diagnostics from a recovered tree.

use rowan::{NodeOrToken, TextRange, TextSize, WalkEvent};

use super::{ErrorCode, RelatedInfo, SyntaxError};
use crate::automaton::Automaton;
use crate::parser::{SyntaxKind, SyntaxNode, SyntaxToken};

/// Every diagnostic recorded in `root`, in source order. `cut_off` is where
/// the parse stopped lexing at its token limit, if it did.
pub fn collect_errors(root: &SyntaxNode, automaton: &Automaton, cut_off: Option<TextSize>) -> Vec<SyntaxError> {
    let mut errors = Vec::new();
    for event in root.preorder_with_tokens() {
        let WalkEvent::Enter(element) = event else {
            continue;
        };
        match element {
            NodeOrToken::Token(token) => {
                if let Some(error) = token_error(&token, automaton, cut_off) {
                    errors.push(error);
                }
            }
            NodeOrToken::Node(node) => {
                if let Some(error) = node_error(&node, automaton) {
                    errors.push(error);
                }
            }
        }
    }
    errors
}

fn token_error(token: &SyntaxToken, automaton: &Automaton, cut_off: Option<TextSize>) -> Option<SyntaxError> {
    let kind = SyntaxKind::from(token.kind());
    if kind == SyntaxKind::ERROR {
        let text = token.text();
        let range = token.text_range();
        let error = if cut_off == Some(range.start()) {
            SyntaxError::new(ErrorCode::E0102.default_message(), range, ErrorCode::E0102)
                .with_hint("raise the token limit to parse the whole input")
        } else if text.chars().count() == 1 {
            SyntaxError::new(format!("unrecognized character {text:?}"), range, ErrorCode::E0101)
        } else {
            SyntaxError::new(format!("unrecognized input {text:?}"), range, ErrorCode::E0101)
        };
        return Some(error);
    }
    if kind.is_missing() {
        let label = automaton.display_symbol(kind);
        let mut error = SyntaxError::new(
            format!("missing {label}"),
            token.text_range(),
            ErrorCode::E0202,
        )
        .with_hint(format!("insert {label}"));
        if let Some(previous) = previous_real_token(token, automaton) {
            error = error.with_related(RelatedInfo::new("expected after this", previous.text_range()));
        }
        return Some(error);
    }
    None
}

fn node_error(node: &SyntaxNode, automaton: &Automaton) -> Option<SyntaxError> {
    let kind = SyntaxKind::from(node.kind());
    let range = node.text_range();
    if kind.is_missing() {
        return Some(SyntaxError::new(
            format!("missing {}", automaton.display_symbol(kind)),
            range,
            ErrorCode::E0203,
        ));
    }
    if kind == SyntaxKind::ERROR && node.parent().is_none() {
        return Some(SyntaxError::new(
            ErrorCode::E0204.default_message(),
            range,
            ErrorCode::E0204,
        ));
    }
    if kind != SyntaxKind::ERROR && kind != SyntaxKind::ERROR_SYMBOL {
        return None;
    }
    if range.is_empty() {
        return Some(SyntaxError::new("syntax error", range, ErrorCode::E0201));
    }

    // Unscannable characters already get their own diagnostic.
    let first = node
        .descendants_with_tokens()
        .filter_map(NodeOrToken::into_token)
        .filter(|token| {
            let kind = SyntaxKind::from(token.kind());
            kind != SyntaxKind::ERROR && !kind.is_missing() && !automaton.is_extra(kind)
        })
        .next()?;
    let found = automaton.display_symbol(SyntaxKind::from(first.kind()));
    Some(
        SyntaxError::new(format!("unexpected {found}"), trimmed_range(node, automaton), ErrorCode::E0201)
            .with_hint("remove or fix the highlighted input"),
    )
}

/// `node`'s range without leading and trailing extras.
fn trimmed_range(node: &SyntaxNode, automaton: &Automaton) -> TextRange {
    let mut tokens = node
        .descendants_with_tokens()
        .filter_map(NodeOrToken::into_token)
        .filter(|token| !automaton.is_extra(SyntaxKind::from(token.kind())));
    let Some(first) = tokens.next() else {
        return node.text_range();
    };
    let last = tokens.last().unwrap_or_else(|| first.clone());
    TextRange::new(first.text_range().start(), last.text_range().end())
}

fn previous_real_token(token: &SyntaxToken, automaton: &Automaton) -> Option<SyntaxToken> {
    let mut current = token.prev_token();
    while let Some(previous) = current {
        let kind = SyntaxKind::from(previous.kind());
        if !previous.text_range().is_empty() && !automaton.is_extra(kind) {
            return Some(previous);
        }
        current = previous.prev_token();
    }
    None
}
