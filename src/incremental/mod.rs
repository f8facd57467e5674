//! Incremental re-parsing
//!
//! After an edit, the innermost prior node that strictly contains every
//! token the edit touches is re-parsed in place:
//!
//! ```text
//! prior tree ──► invalid region ──► anchor node ──► replay prefix states
//!                                       ▲                  │
//!                                       │ widen            ▼
//!                                    desync ◄── engine from anchor start
//!                                                          │ sync
//!                                                          ▼
//!                                      splice new node, share the rest
//! ```
//!
//! The engine resumes from the parser states the prior parse had at the
//! anchor's start, rebuilt by replaying the anchor's left siblings. It is in
//! sync once it reduces a node of the anchor's kind over the shifted anchor
//! range with the anchor's old follower token as lookahead; from there on
//! the prior parse continues exactly as before, so the rest of the tree is
//! kept. Anything else widens the window, and after
//! [`IncrementalOptions::max_attempts`] windows the document is parsed from
//! scratch. Both paths share unchanged subtrees through a [`ReusePool`]: a
//! window pools only its anchor's elements, and only the fallback pools the
//! whole prior tree.

mod edit;
mod reuse;

pub use edit::{Edit, EditError};
pub use reuse::ReusePool;

use rowan::{GreenNode, NodeOrToken, TextRange, TextSize, TokenAtOffset};
use tracing::{debug, warn};

use crate::automaton::{Action, Automaton, StateId};
use crate::language::Language;
use crate::parser::{
    Engine, Outcome, Parse, ParseOptions, ParseStats, SyntaxKind, SyntaxNode, SyntaxToken,
    Window, parse_green,
};

/// Re-parse configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncrementalOptions {
    pub parse: ParseOptions,
    /// Bytes a window may scan past the end of its anchor
    pub max_rescan: u32,
    /// Windows tried before parsing the whole document
    pub max_attempts: usize,
}

impl Default for IncrementalOptions {
    fn default() -> Self {
        Self {
            parse: ParseOptions::default(),
            max_rescan: 4096,
            max_attempts: 8,
        }
    }
}

/// Re-parse `new_text`, produced from `prior`'s text by `edit`.
pub fn reparse(prior: &Parse, edit: &Edit, new_text: &str, language: &Language) -> Parse {
    reparse_with(prior, edit, new_text, language, &IncrementalOptions::default())
}

pub fn reparse_with(
    prior: &Parse,
    edit: &Edit,
    new_text: &str,
    language: &Language,
    options: &IncrementalOptions,
) -> Parse {
    let old_root = prior.syntax();

    if !prior.language().ptr_eq(language) {
        warn!(
            prior = prior.language().name(),
            language = language.name(),
            "prior tree was built by another language; parsing from scratch"
        );
        return full_parse(new_text, language, &options.parse, None, ParseStats::default());
    }
    if let Err(error) = edit.validate_tree(&old_root, new_text) {
        warn!(%error, "edit does not match the documents; parsing from scratch");
        return full_parse(new_text, language, &options.parse, None, ParseStats::default());
    }
    if edit.is_noop() {
        let stats = ParseStats {
            cut_off: prior.stats().cut_off,
            ..ParseStats::default()
        };
        return Parse::new(prior.green().clone(), language.clone(), stats);
    }

    let mut stats = ParseStats::default();

    if options.parse.max_tokens.is_none() {
        let reparser = Reparser {
            automaton: language.automaton(),
            root: &old_root,
            edit,
            new_text,
            options,
        };
        match reparser.run(&mut stats) {
            Some((green, range)) => {
                stats.reparsed = Some(range);
                return Parse::new(green, language.clone(), stats);
            }
            None => debug!(attempts = stats.attempts, "no window resynchronized"),
        }
    }
    let pool = ReusePool::new(&old_root, edit);
    full_parse(new_text, language, &options.parse, Some(&pool), stats)
}

fn full_parse(
    text: &str,
    language: &Language,
    options: &ParseOptions,
    pool: Option<&ReusePool>,
    mut stats: ParseStats,
) -> Parse {
    let (green, parsed) = parse_green(text, language.automaton(), options, pool);
    stats.absorb(&parsed);
    stats.full_reparse = true;
    stats.reparsed = Some(TextRange::up_to(TextSize::of(text)));
    Parse::new(green, language.clone(), stats)
}

struct Reparser<'a> {
    automaton: &'a Automaton,
    root: &'a SyntaxNode,
    edit: &'a Edit,
    new_text: &'a str,
    options: &'a IncrementalOptions,
}

impl Reparser<'_> {
    /// The new root and the re-parsed range, or `None` when every window
    /// desynchronized.
    fn run(&self, stats: &mut ParseStats) -> Option<(GreenNode, TextRange)> {
        let invalid = self.invalid_region()?;
        let first_error = first_error_start(self.root);

        let mut candidate = match self.root.covering_element(invalid) {
            NodeOrToken::Node(node) => Some(node),
            NodeOrToken::Token(token) => token.parent(),
        };
        while let Some(node) = candidate {
            if stats.attempts >= self.options.max_attempts {
                break;
            }
            if !self.is_anchor(&node, invalid, first_error) {
                candidate = node.parent();
                continue;
            }
            stats.attempts += 1;
            match self.try_window(&node, stats) {
                Ok((green, range)) => {
                    stats.built_nodes += node.ancestors().count() - 1;
                    let root = node.replace_with(green);
                    if root.text_len() != TextSize::of(self.new_text) {
                        warn!("spliced tree does not cover the new text");
                        return None;
                    }
                    return Some((root, range));
                }
                Err(reason) => {
                    debug!(
                        reason,
                        kind = self.automaton.kind_name(SyntaxKind::from(node.kind())),
                        range = ?node.text_range(),
                        "window desynchronized; widening"
                    );
                    candidate = node.parent();
                }
            }
        }
        None
    }

    /// Prior tokens touching the edited range, in old coordinates.
    fn invalid_region(&self) -> Option<TextRange> {
        let mut range: Option<TextRange> = None;
        for offset in [self.edit.start, self.edit.old_end()] {
            let tokens: Vec<SyntaxToken> = match self.root.token_at_offset(offset) {
                TokenAtOffset::None => Vec::new(),
                TokenAtOffset::Single(token) => vec![token],
                TokenAtOffset::Between(left, right) => vec![left, right],
            };
            for token in tokens {
                let token_range = token.text_range();
                range = Some(range.map_or(token_range, |r| r.cover(token_range)));
            }
        }
        let edited = self.edit.old_range();
        range.map(|r| r.cover(edited))
    }

    fn is_anchor(&self, node: &SyntaxNode, invalid: TextRange, first_error: Option<TextSize>) -> bool {
        let range = node.text_range();
        let kind = SyntaxKind::from(node.kind());
        node.parent().is_some()
            && !kind.is_missing()
            && !matches!(kind, SyntaxKind::ERROR | SyntaxKind::ERROR_SYMBOL)
            && range.start() < invalid.start()
            && invalid.end() < range.end()
            && first_error.is_none_or(|error| error > range.start())
    }

    fn try_window(&self, anchor: &SyntaxNode, stats: &mut ParseStats) -> Result<(GreenNode, TextRange), &'static str> {
        let (states, prefix_end) = replay(self.automaton, anchor).ok_or("prefix replay failed")?;
        let old_range = anchor.text_range();
        let start = old_range.start();
        let end = self.edit.shift(old_range.end());

        let first = anchor
            .descendants_with_tokens()
            .filter_map(NodeOrToken::into_token)
            .find(|token| self.is_real(token))
            .map(|token| (SyntaxKind::from(token.kind()), token.text_range()));
        let follower = self
            .follower(old_range.end())
            .map(|token| {
                let range = token.text_range();
                let shifted = TextRange::new(self.edit.shift(range.start()), self.edit.shift(range.end()));
                (SyntaxKind::from(token.kind()), shifted)
            });

        let window = Window {
            kind: SyntaxKind::from(anchor.kind()),
            start,
            end,
            first,
            follower,
            limit: end + TextSize::new(self.options.max_rescan),
        };
        // Only the anchor's own elements can be shared by the window
        let pool = ReusePool::new(anchor, self.edit);
        let engine = Engine::windowed(
            self.new_text,
            self.automaton,
            &self.options.parse,
            &states,
            prefix_end,
            window,
        )
        .with_reuse(&pool);
        let (outcome, window_stats) = engine.run();
        stats.absorb(&window_stats);
        match outcome {
            Outcome::Synced(green) => Ok((green, TextRange::new(start, end))),
            Outcome::Desync(reason) => Err(reason),
            Outcome::Root(_) => Err("window produced a whole tree"),
        }
    }

    /// Non-extra token with text; zero-width missing tokens never lead or
    /// follow a node in the parser's view.
    fn is_real(&self, token: &SyntaxToken) -> bool {
        let kind = SyntaxKind::from(token.kind());
        !token.text_range().is_empty() && !self.automaton.is_extra(kind)
    }

    /// The first real token at or after `offset` in the prior tree.
    fn follower(&self, offset: TextSize) -> Option<SyntaxToken> {
        let mut token = match self.root.token_at_offset(offset) {
            TokenAtOffset::None => return None,
            TokenAtOffset::Single(token) => token,
            TokenAtOffset::Between(_, right) => right,
        };
        loop {
            if token.text_range().start() >= offset && self.is_real(&token) {
                return Some(token);
            }
            token = token.next_token()?;
        }
    }
}

/// Parser states the prior parse had just before `anchor`, bottom first,
/// and the end of the last element they stand for.
fn replay(automaton: &Automaton, anchor: &SyntaxNode) -> Option<(Vec<StateId>, TextSize)> {
    let mut path: Vec<SyntaxNode> = anchor.ancestors().collect();
    path.reverse();

    let mut states: Vec<StateId> = vec![0];
    let mut prefix_end = TextSize::new(0);
    for pair in path.windows(2) {
        let (parent, child) = (&pair[0], &pair[1]);
        let parent_kind = SyntaxKind::from(parent.kind());
        if parent_kind.is_missing() || matches!(parent_kind, SyntaxKind::ERROR | SyntaxKind::ERROR_SYMBOL) {
            return None;
        }
        for sibling in parent.children_with_tokens() {
            if sibling.index() == child.index() {
                break;
            }
            let kind = SyntaxKind::from(sibling.kind());
            if kind == SyntaxKind::ERROR || automaton.is_extra(kind) {
                continue;
            }
            let kind = kind.symbol();
            let state = *states.last()?;
            let next = if automaton.is_terminal(kind) {
                match automaton.action(state, kind) {
                    Action::Shift(target) => target,
                    _ => return None,
                }
            } else {
                automaton.goto(state, kind)?
            };
            states.push(next);
            prefix_end = sibling.text_range().end();
        }
    }
    Some((states, prefix_end))
}

/// Start of the first error or missing element, if any.
fn first_error_start(root: &SyntaxNode) -> Option<TextSize> {
    root.descendants_with_tokens()
        .find(|element| {
            let kind = SyntaxKind::from(element.kind());
            kind.is_missing() || matches!(kind, SyntaxKind::ERROR | SyntaxKind::ERROR_SYMBOL)
        })
        .map(|element| element.text_range().start())
}
