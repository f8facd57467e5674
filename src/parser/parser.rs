//! Table-driven LR parse engine
//!
//! Drives a compiled [`Automaton`] over the token stream and builds a rowan
//! green tree bottom-up. Extras travel as leading trivia of the next token
//! and are hoisted out of reduced nodes, so every node spans exactly its
//! first to last child; the root spans the whole input. Parsing never fails:
//! unexpected input is repaired by [`super::recovery`] and surfaces as error
//! and missing elements.

use rowan::{GreenNode, GreenToken, NodeOrToken};
use std::mem;
use text_size::{TextRange, TextSize};
use tracing::{debug, trace};

use super::errors::{SyntaxError, collect_errors};
use super::lexer::{Lexer, Token};
use super::recovery::{Planner, RecoveryOptions, Repair};
use super::stack::{Entry, element_len};
use super::syntax_kind::{GreenElement, SyntaxKind, SyntaxNode};
use crate::automaton::{Action, Automaton, ProductionId, StateId};
use crate::incremental::ReusePool;
use crate::language::Language;
use crate::syntax::Node;

/// Parser configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    pub recovery: RecoveryOptions,
    /// Stop lexing after this many tokens; the rest of the input becomes a
    /// single error token.
    pub max_tokens: Option<usize>,
}

/// Work done by a parse or re-parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Tokens lexed, extras included
    pub tokens: usize,
    pub built_nodes: usize,
    pub reused_nodes: usize,
    pub built_tokens: usize,
    pub reused_tokens: usize,
    /// Error recoveries performed
    pub recoveries: usize,
    /// Range of the new text that was parsed again
    pub reparsed: Option<TextRange>,
    /// Whether a re-parse had to fall back to parsing the whole document
    pub full_reparse: bool,
    /// Windows tried by a re-parse
    pub attempts: usize,
    /// Where lexing stopped because `max_tokens` was reached
    pub cut_off: Option<TextSize>,
}

impl ParseStats {
    pub(crate) fn absorb(&mut self, other: &ParseStats) {
        self.tokens += other.tokens;
        self.built_nodes += other.built_nodes;
        self.reused_nodes += other.reused_nodes;
        self.built_tokens += other.built_tokens;
        self.reused_tokens += other.reused_tokens;
        self.recoveries += other.recoveries;
        self.cut_off = self.cut_off.or(other.cut_off);
    }
}

/// Parse result containing the green tree and any errors
#[derive(Debug, Clone)]
pub struct Parse {
    green: GreenNode,
    language: Language,
    errors: Vec<SyntaxError>,
    stats: ParseStats,
}

impl Parse {
    pub(crate) fn new(green: GreenNode, language: Language, stats: ParseStats) -> Self {
        let root = SyntaxNode::new_root(green.clone());
        let errors = collect_errors(&root, language.automaton(), stats.cut_off);
        Self {
            green,
            language,
            errors,
            stats,
        }
    }

    pub fn green(&self) -> &GreenNode {
        &self.green
    }

    /// Get the root syntax node
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    /// The root of the visible node view
    pub fn root(&self) -> Node {
        Node::root(self.syntax(), self.language.clone())
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    pub fn stats(&self) -> &ParseStats {
        &self.stats
    }

    /// Check if parsing succeeded without errors
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// The source text, reassembled from the tree.
    pub fn text(&self) -> String {
        self.syntax().to_string()
    }

    /// S-expression of the visible tree.
    pub fn to_sexp(&self) -> String {
        self.root().to_sexp()
    }
}

/// Parse `input` with default options.
pub fn parse(input: &str, language: &Language) -> Parse {
    parse_with(input, language, &ParseOptions::default())
}

pub fn parse_with(input: &str, language: &Language, options: &ParseOptions) -> Parse {
    let (green, stats) = parse_green(input, language.automaton(), options, None);
    Parse::new(green, language.clone(), stats)
}

pub(crate) fn parse_green(
    input: &str,
    automaton: &Automaton,
    options: &ParseOptions,
    reuse: Option<&ReusePool>,
) -> (GreenNode, ParseStats) {
    let mut engine = Engine::new(input, automaton, options);
    engine.reuse = reuse;
    let (outcome, stats) = engine.run();
    match outcome {
        Outcome::Root(green) => (green, stats),
        // Only windowed runs end in these
        Outcome::Synced(green) => (green, stats),
        Outcome::Desync(reason) => {
            debug!(reason, "full parse ended without a root");
            (GreenNode::new(SyntaxKind::ERROR.into(), Vec::new()), stats)
        }
    }
}

/// The part of a previous tree a windowed run re-parses.
#[derive(Debug, Clone)]
pub(crate) struct Window {
    /// Kind of the node being replaced
    pub kind: SyntaxKind,
    pub start: TextSize,
    /// End of the node once the edit is applied
    pub end: TextSize,
    /// First real token of the old node
    pub first: Option<(SyntaxKind, TextRange)>,
    /// The token that followed the old node, in new coordinates; `None` for
    /// end of input
    pub follower: Option<(SyntaxKind, TextRange)>,
    /// Scanning past this offset gives up
    pub limit: TextSize,
}

#[derive(Debug)]
pub(crate) enum Outcome {
    /// A complete tree
    Root(GreenNode),
    /// A windowed run rebuilt the node
    Synced(GreenNode),
    /// A windowed run could not rebuild the node in place
    Desync(&'static str),
}

enum Step {
    Continue,
    Done(Outcome),
}

/// Consecutive recoveries at one offset before input is dropped unconditionally.
const MAX_STALLS: usize = 8;

pub(crate) struct Engine<'a> {
    automaton: &'a Automaton,
    options: &'a ParseOptions,
    lexer: Lexer<'a>,
    stack: Vec<Entry>,
    /// Entries below this index are replayed prefix states without trees
    floor: usize,
    /// Extras and error nodes waiting to lead the next shifted element
    pending: Vec<GreenElement>,
    lookahead: Token<'a>,
    window: Option<Window>,
    reuse: Option<&'a ReusePool>,
    stats: ParseStats,
    stalled: (TextSize, usize),
}

/// A token seen while planning a recovery, with the extras before it.
struct Planned<'a> {
    leading: Vec<Token<'a>>,
    token: Token<'a>,
}

impl<'a> Engine<'a> {
    pub fn new(input: &'a str, automaton: &'a Automaton, options: &'a ParseOptions) -> Self {
        Self {
            automaton,
            options,
            lexer: Lexer::new(input, automaton),
            stack: vec![Entry::bare(0, TextSize::new(0))],
            floor: 1,
            pending: Vec::new(),
            lookahead: Token {
                kind: SyntaxKind::END,
                text: "",
                offset: TextSize::new(0),
            },
            window: None,
            reuse: None,
            stats: ParseStats::default(),
            stalled: (TextSize::new(0), 0),
        }
    }

    /// An engine resuming inside a previous parse: `states` is the replayed
    /// state stack and `prefix_end` the end of the last element it stands for.
    pub fn windowed(
        input: &'a str,
        automaton: &'a Automaton,
        options: &'a ParseOptions,
        states: &[StateId],
        prefix_end: TextSize,
        window: Window,
    ) -> Self {
        let mut engine = Self::new(input, automaton, options);
        engine.stack = states
            .iter()
            .map(|&state| Entry::bare(state, prefix_end))
            .collect();
        engine.floor = engine.stack.len();
        engine.lexer.seek(window.start);
        engine.window = Some(window);
        engine
    }

    pub fn with_reuse(mut self, pool: &'a ReusePool) -> Self {
        self.reuse = Some(pool);
        self
    }

    pub fn run(mut self) -> (Outcome, ParseStats) {
        let outcome = self.drive();
        (outcome, self.stats)
    }

    fn drive(&mut self) -> Outcome {
        self.advance();
        if let Some(window) = &self.window {
            if let Some((kind, range)) = window.first {
                if self.lookahead.kind != kind || self.lookahead.range() != range {
                    return Outcome::Desync("first token changed");
                }
            }
        }

        loop {
            if let Some(window) = &self.window {
                if self.lookahead.offset > window.limit {
                    return Outcome::Desync("scanned past the rescan limit");
                }
            }

            let step = match self.automaton.action(self.top_state(), self.lookahead.kind) {
                Action::Shift(target) => {
                    self.shift(target);
                    self.advance();
                    Step::Continue
                }
                Action::Reduce(production) => self.reduce(production),
                Action::Accept => match self.window {
                    Some(_) => Step::Done(Outcome::Desync("reached the end of the document")),
                    None => Step::Done(Outcome::Root(self.accept())),
                },
                Action::Error => self.recover(),
            };
            if let Step::Done(outcome) = step {
                return outcome;
            }
        }
    }

    fn top_state(&self) -> StateId {
        self.stack.last().map_or(0, |entry| entry.state)
    }

    fn top_end(&self) -> TextSize {
        self.stack.last().map_or(TextSize::new(0), Entry::end)
    }

    /// Give up: in a windowed run report a desync, otherwise wrap everything
    /// into an error root.
    fn fail(&mut self, reason: &'static str) -> Step {
        match self.window {
            Some(_) => Step::Done(Outcome::Desync(reason)),
            None => {
                debug!(reason, "parse truncated");
                Step::Done(Outcome::Root(self.truncate()))
            }
        }
    }

    // =========================================================================
    // Tokens
    // =========================================================================

    /// Lex the next non-extra token in the current state, collecting extras
    /// into `pending`.
    fn advance(&mut self) {
        let automaton = self.automaton;
        let valid = automaton.valid_terminals(self.top_state());
        loop {
            if self.token_limit_reached() {
                self.cut_off();
                return;
            }
            let token = self.lexer.next_token(Some(valid));
            if token.is_end() {
                self.lookahead = token;
                return;
            }
            self.stats.tokens += 1;
            if automaton.is_extra(token.kind) {
                let element = self.make_token(token);
                self.pending.push(element);
                continue;
            }
            self.lookahead = token;
            return;
        }
    }

    fn token_limit_reached(&self) -> bool {
        let at_end = usize::from(self.lexer.offset()) >= self.lexer.input().len();
        !at_end && self.options.max_tokens.is_some_and(|max| self.stats.tokens >= max)
    }

    /// Turn the rest of the input into one error token and stop at its end.
    fn cut_off(&mut self) {
        let input = self.lexer.input();
        let offset = self.lexer.offset();
        let rest = &input[usize::from(offset)..];
        debug!(offset = u32::from(offset), "token limit reached");
        self.stats.cut_off = Some(offset);

        let token = GreenToken::new(SyntaxKind::ERROR.into(), rest);
        self.stats.built_tokens += 1;
        self.push_error(vec![NodeOrToken::Token(token)]);

        let end = TextSize::of(input);
        self.lexer.seek(end);
        self.lookahead = Token {
            kind: SyntaxKind::END,
            text: "",
            offset: end,
        };
    }

    fn make_token(&mut self, token: Token<'_>) -> GreenElement {
        if let Some(reused) = self
            .reuse
            .and_then(|pool| pool.token(token.offset, token.kind, token.text))
        {
            self.stats.reused_tokens += 1;
            return NodeOrToken::Token(reused);
        }
        self.stats.built_tokens += 1;
        NodeOrToken::Token(GreenToken::new(token.kind.into(), token.text))
    }

    fn make_node(&mut self, kind: SyntaxKind, children: Vec<GreenElement>, offset: TextSize) -> GreenElement {
        if let Some(reused) = self
            .reuse
            .and_then(|pool| pool.node(offset, kind, &children))
        {
            self.stats.reused_nodes += 1;
            return NodeOrToken::Node(reused);
        }
        self.stats.built_nodes += 1;
        NodeOrToken::Node(GreenNode::new(kind.into(), children))
    }

    // =========================================================================
    // Actions
    // =========================================================================

    fn shift(&mut self, target: StateId) {
        let token = self.lookahead;
        let element = self.make_token(token);
        self.stack.push(Entry {
            state: target,
            leading: mem::take(&mut self.pending),
            element: Some(element),
            offset: token.offset,
        });
        self.stalled.1 = 0;
    }

    fn reduce(&mut self, production: ProductionId) -> Step {
        let (lhs, offset, end) = match self.reduce_entries(production) {
            Ok(reduced) => reduced,
            Err(reason) => return self.fail(reason),
        };

        if let Some(window) = &self.window {
            let at_window_depth = self.stack.len() == self.floor + 1;
            if at_window_depth && lhs == window.kind && offset == window.start {
                if end > window.end {
                    return Step::Done(Outcome::Desync("rebuilt node overshoots the edit"));
                }
                let lookahead_matches = match window.follower {
                    Some((kind, range)) => {
                        self.lookahead.kind == kind && self.lookahead.range() == range
                    }
                    None => self.lookahead.is_end(),
                };
                if end == window.end && lookahead_matches {
                    if let Some(Entry {
                        element: Some(NodeOrToken::Node(node)),
                        ..
                    }) = self.stack.pop()
                    {
                        return Step::Done(Outcome::Synced(node));
                    }
                }
            }
        }
        Step::Continue
    }

    /// Replace the production's entries with one node and take the goto.
    /// Returns the node's kind and extent.
    fn reduce_entries(
        &mut self,
        production: ProductionId,
    ) -> Result<(SyntaxKind, TextSize, TextSize), &'static str> {
        let automaton = self.automaton;
        let production = automaton.production(production);
        let count = production.len();
        if self.stack.len() < self.floor + count {
            return Err("reduced past the start of the window");
        }

        let entries = self.stack.split_off(self.stack.len() - count);
        let offset = entries.first().map_or_else(|| self.top_end(), |entry| entry.offset);
        let mut leading = Vec::new();
        let mut children = Vec::new();
        for (index, entry) in entries.into_iter().enumerate() {
            if index == 0 {
                leading = entry.leading;
                children.extend(entry.element);
            } else {
                children.extend(entry.into_elements());
            }
        }

        let Some(target) = automaton.goto(self.top_state(), production.lhs) else {
            return Err("missing goto");
        };
        let node = self.make_node(production.lhs, children, offset);
        let end = offset + element_len(&node);
        self.stack.push(Entry {
            state: target,
            leading,
            element: Some(node),
            offset,
        });
        Ok((production.lhs, offset, end))
    }

    /// The start entry's children plus all surrounding trivia, under one
    /// node of the start kind.
    fn accept(&mut self) -> GreenNode {
        let mut children = Vec::new();
        if let Some(entry) = self.stack.pop() {
            children = entry.leading;
            match entry.element {
                Some(NodeOrToken::Node(node)) => {
                    children.extend(node.children().map(|child| child.to_owned()));
                }
                Some(token) => children.push(token),
                None => {}
            }
        }
        children.extend(mem::take(&mut self.pending));
        GreenNode::new(self.automaton.start_kind().into(), children)
    }

    /// Everything parsed so far, under a single error root.
    fn truncate(&mut self) -> GreenNode {
        let mut children: Vec<GreenElement> = Vec::new();
        for entry in self.stack.drain(..) {
            children.extend(entry.into_elements());
        }
        children.extend(mem::take(&mut self.pending));
        if !self.lookahead.is_end() {
            self.lexer.seek(self.lookahead.offset);
            let rest: Vec<Token<'a>> = self.lexer.by_ref().collect();
            for token in rest {
                let element = self.make_token(token);
                children.push(element);
            }
        }
        self.stats.built_nodes += 1;
        GreenNode::new(SyntaxKind::ERROR.into(), children)
    }

    // =========================================================================
    // Recovery
    // =========================================================================

    fn recover(&mut self) -> Step {
        self.stats.recoveries += 1;
        let offset = self.lookahead.offset;
        self.stalled = match self.stalled {
            (at, count) if at == offset => (at, count + 1),
            _ => (offset, 1),
        };

        let planned = self.plan_tokens();
        let repair = if self.stalled.1 > MAX_STALLS {
            if self.lookahead.is_end() {
                Repair::Truncate
            } else {
                Repair::Skip
            }
        } else {
            let states: Vec<StateId> = self.stack.iter().map(|entry| entry.state).collect();
            let kinds: Vec<SyntaxKind> = planned.iter().map(|p| p.token.kind).collect();
            Planner::new(self.automaton, &self.options.recovery).plan(&states, &kinds)
        };
        trace!(?repair, offset = u32::from(offset), "recovering");

        if self.window.is_some()
            && (repair == Repair::Truncate || repair.depth() > self.stack.len() - self.floor)
        {
            return Step::Done(Outcome::Desync("recovery reached before the window"));
        }

        match repair {
            Repair::Delete { count } => self.delete(&planned[..count]),
            Repair::Skip => self.delete(&planned[..1]),
            Repair::PopInsert { depth, insert } => {
                self.pop_to_pending(depth);
                self.lexer.seek(self.lookahead.range().end());
                if let Some(symbol) = insert {
                    if !self.insert_missing(symbol) {
                        return self.fail("missing symbol has no transition");
                    }
                }
            }
            Repair::Catch { depth, skip } => {
                if !self.catch_error(depth, &planned[..skip]) {
                    return self.fail("error symbol has no transition");
                }
            }
            Repair::Truncate => return Step::Done(Outcome::Root(self.truncate())),
        }
        Step::Continue
    }

    /// The lookahead followed by globally lexed tokens, up to the planning
    /// horizon or end of input.
    fn plan_tokens(&mut self) -> Vec<Planned<'a>> {
        let mut planned = vec![Planned {
            leading: Vec::new(),
            token: self.lookahead,
        }];
        if self.lookahead.is_end() {
            return planned;
        }
        self.lexer.seek(self.lookahead.range().end());
        let mut leading = Vec::new();
        while planned.len() < self.options.recovery.horizon() {
            let token = self.lexer.next_token(None);
            if self.automaton.is_extra(token.kind) {
                leading.push(token);
                continue;
            }
            let end = token.is_end();
            planned.push(Planned {
                leading: mem::take(&mut leading),
                token,
            });
            if end {
                break;
            }
        }
        planned
    }

    fn push_error(&mut self, elements: Vec<GreenElement>) {
        let mut children = Vec::new();
        if let Some(NodeOrToken::Node(last)) = self.pending.last() {
            if SyntaxKind::from(last.kind()) == SyntaxKind::ERROR {
                children.extend(last.children().map(|child| child.to_owned()));
                self.pending.pop();
            }
        }
        children.extend(elements);
        self.stats.built_nodes += 1;
        self.pending
            .push(NodeOrToken::Node(GreenNode::new(SyntaxKind::ERROR.into(), children)));
    }

    /// Turn `tokens` (starting with the lookahead) into an error node and
    /// lex on after them.
    fn delete(&mut self, tokens: &[Planned<'a>]) {
        let mut elements = Vec::new();
        for planned in tokens {
            for extra in &planned.leading {
                let element = self.make_token(*extra);
                elements.push(element);
            }
            let element = self.make_token(planned.token);
            elements.push(element);
        }
        self.push_error(elements);
        let resume = tokens
            .last()
            .map_or(self.lookahead.range().end(), |p| p.token.range().end());
        self.lexer.seek(resume);
        self.advance();
    }

    /// Move the top `depth` entries into an error node at the front of
    /// `pending`.
    fn pop_to_pending(&mut self, depth: usize) {
        if depth == 0 {
            return;
        }
        let popped = self.stack.split_off(self.stack.len() - depth);
        let mut leading = Vec::new();
        let mut elements = Vec::new();
        for (index, entry) in popped.into_iter().enumerate() {
            if index == 0 {
                leading = entry.leading;
                elements.extend(entry.element);
            } else {
                elements.extend(entry.into_elements());
            }
        }
        self.stats.built_nodes += 1;
        leading.push(NodeOrToken::Node(GreenNode::new(SyntaxKind::ERROR.into(), elements)));
        leading.append(&mut self.pending);
        self.pending = leading;
    }

    /// Push a missing `symbol`; a terminal first takes the reductions it
    /// would cause as a lookahead.
    fn insert_missing(&mut self, symbol: SyntaxKind) -> bool {
        let (element, target) = if self.automaton.is_terminal(symbol) {
            let Some(target) = self.reduce_before(symbol) else {
                return false;
            };
            let token = GreenToken::new(symbol.missing().into(), "");
            (NodeOrToken::Token(token), target)
        } else {
            let Some(target) = self.automaton.goto(self.top_state(), symbol) else {
                return false;
            };
            let node = GreenNode::new(symbol.missing().into(), Vec::new());
            (NodeOrToken::Node(node), target)
        };
        self.stats.built_nodes += 1;
        let offset = self.top_end();
        self.stack.push(Entry {
            state: target,
            leading: Vec::new(),
            element: Some(element),
            offset,
        });
        true
    }

    /// Reduce as if `lookahead` came next; the state shifting it leads to.
    fn reduce_before(&mut self, lookahead: SyntaxKind) -> Option<StateId> {
        loop {
            match self.automaton.action(self.top_state(), lookahead) {
                Action::Shift(target) => return Some(target),
                Action::Reduce(production) => {
                    self.reduce_entries(production).ok()?;
                }
                Action::Accept | Action::Error => return None,
            }
        }
    }

    /// Pop `depth` entries, reduce as if `error` were the lookahead, then
    /// wrap the popped entries and skipped tokens into an `error` node and
    /// shift it.
    fn catch_error(&mut self, depth: usize, skipped: &[Planned<'a>]) -> bool {
        let popped = self.stack.split_off(self.stack.len() - depth);
        let Some(target) = self.reduce_before(SyntaxKind::ERROR_SYMBOL) else {
            return false;
        };

        let mut leading = Vec::new();
        let mut children = Vec::new();
        let mut offset = None;
        for (index, entry) in popped.into_iter().enumerate() {
            if index == 0 {
                offset = Some(entry.offset);
                leading = entry.leading;
                children.extend(entry.element);
            } else {
                children.extend(entry.into_elements());
            }
        }
        if offset.is_none() {
            leading = mem::take(&mut self.pending);
        } else {
            children.append(&mut self.pending);
        }

        for (index, planned) in skipped.iter().enumerate() {
            if index > 0 {
                for extra in &planned.leading {
                    let element = self.make_token(*extra);
                    children.push(element);
                }
            }
            let element = self.make_token(planned.token);
            children.push(element);
        }

        let offset = offset.unwrap_or(self.lookahead.offset);
        self.stats.built_nodes += 1;
        let node = GreenNode::new(SyntaxKind::ERROR_SYMBOL.into(), children);
        self.stack.push(Entry {
            state: target,
            leading,
            element: Some(NodeOrToken::Node(node)),
            offset,
        });

        match skipped.last() {
            Some(last) => {
                self.lexer.seek(last.token.range().end());
                self.advance();
            }
            None => self.lexer.seek(self.lookahead.range().end()),
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ErrorCode;

    fn arith() -> Language {
        Language::from_source(
            r#"grammar arith; extras ws; token ws = /\s+/; token number = /[0-9]+/;
               expr = @left(1) expr "+" expr | number;"#,
        )
        .unwrap()
    }

    fn statements() -> Language {
        Language::from_source(
            r#"grammar statements; start list; extras ws; token ws = /\s+/;
               token n = /[0-9]+/;
               list = item*;
               item = n ";" | error ";";"#,
        )
        .unwrap()
    }

    #[test]
    fn test_left_associative_tree() {
        let parse = parse("1 + 2 + 3", &arith());
        assert!(parse.ok(), "{:?}", parse.errors());
        assert_eq!(
            parse.to_sexp(),
            "(expr (expr (expr (number)) (expr (number))) (expr (number)))"
        );
    }

    #[test]
    fn test_root_spans_surrounding_trivia() {
        let parse = parse("  1 \n", &arith());
        assert!(parse.ok());
        assert_eq!(parse.text(), "  1 \n");
        let root = parse.syntax();
        assert_eq!(root.text_range(), TextRange::new(0.into(), 5.into()));
        assert_eq!(parse.to_sexp(), "(expr (number))");
    }

    #[test]
    fn test_missing_operand_at_end() {
        let parse = parse("1+", &arith());
        assert_eq!(parse.to_sexp(), "(expr (expr (number)) (expr (MISSING number)))");
        assert_eq!(parse.text(), "1+");
        assert_eq!(parse.stats().recoveries, 1);
    }

    #[test]
    fn test_empty_input_inserts_missing_token() {
        let parse = parse("", &arith());
        assert_eq!(parse.to_sexp(), "(expr (MISSING number))");
        assert_eq!(parse.errors()[0].code, ErrorCode::E0202);
    }

    #[test]
    fn test_empty_repetition_accepts_empty_input() {
        let parse = parse(" ", &statements());
        assert!(parse.ok());
        assert_eq!(parse.to_sexp(), "(list)");
    }

    #[test]
    fn test_error_symbol_catches_bad_item() {
        let parse = parse("1; x; 2;", &statements());
        assert_eq!(parse.text(), "1; x; 2;");
        let root = parse.root();
        let items = root.named_children();
        assert_eq!(items.len(), 3);
        assert!(!items[0].has_error());
        assert!(items[1].has_error());
        assert!(!items[2].has_error());
        let codes: Vec<_> = parse.errors().iter().map(|e| e.code).collect();
        assert_eq!(codes, [ErrorCode::E0101]);
    }

    #[test]
    fn test_token_limit_cuts_off_input() {
        let options = ParseOptions {
            max_tokens: Some(3),
            ..Default::default()
        };
        let parse = parse_with("1 + 2 + 3", &arith(), &options);
        assert_eq!(parse.text(), "1 + 2 + 3");
        assert!(parse.errors().iter().any(|e| e.code == ErrorCode::E0102));
        assert_eq!(parse.stats().tokens, 3);
        assert_eq!(parse.stats().cut_off, Some(TextSize::new(3)));
    }

    #[test]
    fn test_single_char_remainder_is_cut_off_not_unrecognized() {
        let options = ParseOptions {
            max_tokens: Some(2),
            ..Default::default()
        };
        let parse = parse_with("1+2", &arith(), &options);
        assert_eq!(parse.text(), "1+2");
        assert_eq!(parse.stats().cut_off, Some(TextSize::new(2)));

        let cut = parse
            .errors()
            .iter()
            .find(|e| e.code == ErrorCode::E0102)
            .unwrap();
        assert_eq!(cut.range, TextRange::new(TextSize::new(2), TextSize::new(3)));
        assert!(parse.errors().iter().all(|e| e.code != ErrorCode::E0101));
    }

    #[test]
    fn test_stats_count_built_elements() {
        let parse = parse("1 + 2", &arith());
        let stats = parse.stats();
        assert_eq!(stats.tokens, 5);
        assert_eq!(stats.built_tokens, 5);
        assert_eq!(stats.built_nodes, 3);
        assert_eq!(stats.reused_nodes, 0);
        assert_eq!(stats.recoveries, 0);
    }

    #[test]
    fn test_garbage_never_panics() {
        let language = arith();
        for input in ["+", "++++", "1 1 1", "$$$", "1 + (2)", "\n\n+1+\n", "1 +  + + 2 3"] {
            let parse = parse(input, &language);
            assert_eq!(parse.text(), input);
            assert!(!parse.ok(), "{input:?} should have errors");
        }
    }
}
