//! The compiled parse automaton.
//!
//! An [`Automaton`] is the output of [`crate::compile`]: the symbol table,
//! the flattened productions, the LR tables and the token matchers. It is
//! immutable, `Send + Sync`, and can be persisted with
//! [`Automaton::to_json`] / [`Automaton::save`].

mod serialize;
mod table;

pub use serialize::{FORMAT_VERSION, LoadError};
pub use table::{Action, ParseTable, ProductionId, StateId};

use regex_automata::dfa::{Automaton as _, StartKind, dense};
use regex_automata::{Anchored, Input, MatchKind};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;

use crate::grammar::Precedence;
use crate::parser::SyntaxKind;

/// What a symbol is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    /// End of input
    End,
    /// Error nodes and unscannable input
    Error,
    /// The catch-all `error` terminal
    ErrorSymbol,
    /// A token declared with a name
    Token,
    /// An anonymous token written inline in a rule
    Literal,
    Rule,
    /// Helper rule generated for a repetition
    Auxiliary,
    /// The augmented start rule
    Start,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolMetadata {
    pub name: SmolStr,
    pub kind: SymbolKind,
    /// Shown in the public node view
    pub visible: bool,
    /// Named (as opposed to anonymous literal) symbols
    pub named: bool,
    pub extra: bool,
}

impl SymbolMetadata {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.kind,
            SymbolKind::End
                | SymbolKind::Error
                | SymbolKind::ErrorSymbol
                | SymbolKind::Token
                | SymbolKind::Literal
        )
    }
}

/// A flattened BNF production.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Production {
    pub lhs: SyntaxKind,
    pub rhs: Vec<SyntaxKind>,
    /// Field label for each right-hand-side position
    pub fields: Vec<Option<SmolStr>>,
    pub prec: Option<Precedence>,
}

impl Production {
    pub fn len(&self) -> usize {
        self.rhs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rhs.is_empty()
    }

    pub fn prec_level(&self) -> i32 {
        self.prec.map_or(0, |p| p.level)
    }
}

/// Recognises one terminal at the start of a string.
///
/// Patterns match the longest prefix they can, so `/a|ab/` takes all of
/// `ab` rather than stopping at the first alternative.
#[derive(Debug, Clone)]
pub enum TokenMatcher {
    Literal(SmolStr),
    Pattern { source: SmolStr, dfa: dense::DFA<Vec<u32>> },
}

impl TokenMatcher {
    /// Compile a pattern into an anchored longest-match DFA.
    pub fn pattern(source: impl Into<SmolStr>) -> Result<Self, regex::Error> {
        let source = source.into();
        // Syntax errors are reported in `regex` terms
        regex::Regex::new(&source)?;
        let dfa = dense::Builder::new()
            .configure(
                dense::Config::new()
                    .match_kind(MatchKind::All)
                    .start_kind(StartKind::Anchored),
            )
            .build(&source)
            .map_err(|err| regex::Error::Syntax(err.to_string()))?;
        Ok(Self::Pattern { source, dfa })
    }

    fn longest_prefix(dfa: &dense::DFA<Vec<u32>>, text: &str) -> Option<usize> {
        let input = Input::new(text).anchored(Anchored::Yes);
        dfa.try_search_fwd(&input).ok().flatten().map(|m| m.offset())
    }

    /// Length of the non-empty match at the start of `text`.
    pub fn match_len(&self, text: &str) -> Option<usize> {
        let len = match self {
            Self::Literal(literal) => text.starts_with(literal.as_str()).then(|| literal.len())?,
            Self::Pattern { dfa, .. } => Self::longest_prefix(dfa, text)?,
        };
        (len > 0).then_some(len)
    }

    /// Whether the matcher accepts the empty string.
    pub fn matches_empty(&self) -> bool {
        match self {
            Self::Literal(literal) => literal.is_empty(),
            Self::Pattern { dfa, .. } => Self::longest_prefix(dfa, "").is_some(),
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }

    pub fn source(&self) -> &SmolStr {
        match self {
            Self::Literal(text) => text,
            Self::Pattern { source, .. } => source,
        }
    }
}

impl PartialEq for TokenMatcher {
    fn eq(&self, other: &Self) -> bool {
        self.is_literal() == other.is_literal() && self.source() == other.source()
    }
}

impl Eq for TokenMatcher {}

/// Everything the compiler produces, before the lookup indices are derived.
#[derive(Debug, Clone)]
pub(crate) struct AutomatonParts {
    pub name: SmolStr,
    pub symbols: Vec<SymbolMetadata>,
    pub terminal_count: usize,
    pub productions: Vec<Production>,
    pub table: ParseTable,
    pub matchers: Vec<Option<TokenMatcher>>,
    pub start: SyntaxKind,
}

/// A compiled grammar.
#[derive(Debug, Clone)]
pub struct Automaton {
    parts: AutomatonParts,
    extras: Vec<SyntaxKind>,
    by_name: FxHashMap<SmolStr, SyntaxKind>,
    by_literal: FxHashMap<SmolStr, SyntaxKind>,
    by_children: FxHashMap<(SyntaxKind, Vec<SyntaxKind>), ProductionId>,
}

impl Automaton {
    pub(crate) fn from_parts(parts: AutomatonParts) -> Self {
        let extras = parts
            .symbols
            .iter()
            .enumerate()
            .filter(|(_, symbol)| symbol.extra)
            .map(|(kind, _)| SyntaxKind(kind as u16))
            .collect();

        let mut by_name = FxHashMap::default();
        let mut by_literal = FxHashMap::default();
        for (kind, symbol) in parts.symbols.iter().enumerate() {
            let kind = SyntaxKind(kind as u16);
            if symbol.kind == SymbolKind::Literal {
                by_literal.entry(symbol.name.clone()).or_insert(kind);
            } else if symbol.named {
                by_name.entry(symbol.name.clone()).or_insert(kind);
            }
        }

        let mut by_children = FxHashMap::default();
        for (id, production) in parts.productions.iter().enumerate() {
            by_children
                .entry((production.lhs, production.rhs.clone()))
                .or_insert(id as ProductionId);
        }

        Self {
            parts,
            extras,
            by_name,
            by_literal,
            by_children,
        }
    }

    pub(crate) fn parts(&self) -> &AutomatonParts {
        &self.parts
    }

    pub fn name(&self) -> &str {
        &self.parts.name
    }

    pub fn table(&self) -> &ParseTable {
        &self.parts.table
    }

    pub fn state_count(&self) -> usize {
        self.parts.table.state_count()
    }

    pub fn symbol_count(&self) -> usize {
        self.parts.symbols.len()
    }

    pub fn terminal_count(&self) -> usize {
        self.parts.terminal_count
    }

    pub fn is_terminal(&self, kind: SyntaxKind) -> bool {
        kind.symbol().index() < self.parts.terminal_count
    }

    /// The user-facing start rule.
    pub fn start_kind(&self) -> SyntaxKind {
        self.parts.start
    }

    pub fn symbol(&self, kind: SyntaxKind) -> Option<&SymbolMetadata> {
        self.parts.symbols.get(kind.symbol().index())
    }

    pub fn symbols(&self) -> &[SymbolMetadata] {
        &self.parts.symbols
    }

    /// The symbol name, or `"ERROR"` for out-of-range kinds.
    pub fn kind_name(&self, kind: SyntaxKind) -> &str {
        self.symbol(kind).map_or("ERROR", |symbol| symbol.name.as_str())
    }

    /// Look up a named symbol (rule or token) by name.
    pub fn kind_by_name(&self, name: &str) -> Option<SyntaxKind> {
        self.by_name.get(name).copied()
    }

    /// Look up an anonymous literal token by its text.
    pub fn literal_kind(&self, text: &str) -> Option<SyntaxKind> {
        self.by_literal.get(text).copied()
    }

    pub fn is_extra(&self, kind: SyntaxKind) -> bool {
        self.symbol(kind).is_some_and(|symbol| symbol.extra) && !kind.is_missing()
    }

    pub fn is_visible(&self, kind: SyntaxKind) -> bool {
        self.symbol(kind).is_some_and(|symbol| symbol.visible)
    }

    pub fn is_named(&self, kind: SyntaxKind) -> bool {
        self.symbol(kind).is_some_and(|symbol| symbol.named)
    }

    pub fn extras(&self) -> &[SyntaxKind] {
        &self.extras
    }

    pub fn matcher(&self, kind: SyntaxKind) -> Option<&TokenMatcher> {
        self.parts.matchers.get(kind.index()).and_then(Option::as_ref)
    }

    pub fn productions(&self) -> &[Production] {
        &self.parts.productions
    }

    pub fn production(&self, id: ProductionId) -> &Production {
        &self.parts.productions[id as usize]
    }

    /// The first production of `lhs` whose right-hand side is exactly `rhs`.
    pub fn production_for(&self, lhs: SyntaxKind, rhs: &[SyntaxKind]) -> Option<ProductionId> {
        self.by_children.get(&(lhs, rhs.to_vec())).copied()
    }

    pub fn action(&self, state: StateId, lookahead: SyntaxKind) -> Action {
        self.parts.table.action(state, lookahead)
    }

    pub fn goto(&self, state: StateId, nonterminal: SyntaxKind) -> Option<StateId> {
        self.parts.table.goto(state, nonterminal)
    }

    pub fn valid_terminals(&self, state: StateId) -> &[SyntaxKind] {
        self.parts.table.valid_terminals(state)
    }

    /// Render a symbol as it is written in a grammar.
    pub fn display_symbol(&self, kind: SyntaxKind) -> String {
        symbol_label(&self.parts.symbols, kind)
    }

    /// Render a production as `lhs -> a "b" c`.
    pub fn display_production(&self, id: ProductionId) -> String {
        let production = self.production(id);
        display_production(&self.parts.symbols, production)
    }
}

/// A symbol as written in a grammar: literals quoted, everything else by name.
pub(crate) fn symbol_label(symbols: &[SymbolMetadata], kind: SyntaxKind) -> String {
    match symbols.get(kind.symbol().index()) {
        Some(symbol) if symbol.kind == SymbolKind::Literal => format!("{:?}", symbol.name.as_str()),
        Some(symbol) => symbol.name.to_string(),
        None => kind.to_string(),
    }
}

pub(crate) fn display_production(symbols: &[SymbolMetadata], production: &Production) -> String {
    let mut out = symbol_label(symbols, production.lhs);
    out.push_str(" ->");
    if production.rhs.is_empty() {
        out.push_str(" ()");
    }
    for &kind in &production.rhs {
        out.push(' ');
        out.push_str(&symbol_label(symbols, kind));
    }
    out
}

impl fmt::Display for Automaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "grammar {}: {} symbols ({} terminals), {} productions, {} states",
            self.name(),
            self.symbol_count(),
            self.terminal_count(),
            self.productions().len(),
            self.state_count()
        )?;
        for id in 0..self.productions().len() {
            writeln!(f, "  {id}: {}", self.display_production(id as ProductionId))?;
        }
        Ok(())
    }
}
