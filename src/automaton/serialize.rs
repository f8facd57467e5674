//! Versioned JSON form of an [`Automaton`].
//!
//! Tables are stored sparsely (only non-error actions and defined gotos),
//! actions as tagged `u32`s. Regexes are stored as source and recompiled on
//! load, lexical modes are recomputed.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smol_str::SmolStr;
use std::path::Path;
use thiserror::Error;

use super::{Action, Automaton, AutomatonParts, ParseTable, Production, SymbolMetadata, TokenMatcher};
use crate::parser::SyntaxKind;

/// Bumped whenever the persisted layout changes.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read automaton: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed automaton: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported automaton format version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },
    #[error("invalid pattern for token `{name}`: {source}")]
    Pattern {
        name: SmolStr,
        #[source]
        source: regex::Error,
    },
    #[error("inconsistent automaton: {0}")]
    Invalid(String),
}

const TAG_SHIFT: u32 = 1 << 30;
const TAG_REDUCE: u32 = 2 << 30;
const TAG_ACCEPT: u32 = 3 << 30;
const TAG_MASK: u32 = 3 << 30;

fn encode_action(action: Action) -> u32 {
    match action {
        Action::Error => 0,
        Action::Shift(state) => TAG_SHIFT | state,
        Action::Reduce(production) => TAG_REDUCE | production,
        Action::Accept => TAG_ACCEPT,
    }
}

fn decode_action(raw: u32) -> Action {
    let value = raw & !TAG_MASK;
    match raw & TAG_MASK {
        TAG_SHIFT => Action::Shift(value),
        TAG_REDUCE => Action::Reduce(value),
        TAG_ACCEPT => Action::Accept,
        _ => Action::Error,
    }
}

#[derive(Debug, Serialize, Deserialize)]
enum MatcherRepr {
    Literal(SmolStr),
    Pattern(SmolStr),
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StateRepr {
    /// (terminal, encoded action)
    actions: Vec<(u16, u32)>,
    /// (non-terminal, target state)
    gotos: Vec<(u16, u32)>,
}

#[derive(Debug, Serialize, Deserialize)]
struct AutomatonRepr {
    version: u32,
    name: SmolStr,
    start: SyntaxKind,
    terminal_count: usize,
    symbols: Vec<SymbolMetadata>,
    tokens: Vec<Option<MatcherRepr>>,
    productions: Vec<Production>,
    states: Vec<StateRepr>,
}

impl From<&Automaton> for AutomatonRepr {
    fn from(automaton: &Automaton) -> Self {
        let parts = automaton.parts();
        let table = &parts.table;
        let states = (0..table.state_count() as u32)
            .map(|state| {
                let actions = (0..table.terminal_count)
                    .map(|t| SyntaxKind(t as u16))
                    .filter_map(|t| {
                        let action = table.action(state, t);
                        (!action.is_error()).then(|| (t.0, encode_action(action)))
                    })
                    .collect();
                let gotos = (0..table.nonterminal_count)
                    .map(|n| SyntaxKind((table.terminal_count + n) as u16))
                    .filter_map(|n| table.goto(state, n).map(|target| (n.0, target)))
                    .collect();
                StateRepr { actions, gotos }
            })
            .collect();

        Self {
            version: FORMAT_VERSION,
            name: parts.name.clone(),
            start: parts.start,
            terminal_count: parts.terminal_count,
            symbols: parts.symbols.clone(),
            tokens: parts
                .matchers
                .iter()
                .map(|matcher| {
                    matcher.as_ref().map(|m| match m {
                        TokenMatcher::Literal(text) => MatcherRepr::Literal(text.clone()),
                        TokenMatcher::Pattern { source, .. } => MatcherRepr::Pattern(source.clone()),
                    })
                })
                .collect(),
            productions: parts.productions.clone(),
            states,
        }
    }
}

impl TryFrom<AutomatonRepr> for Automaton {
    type Error = LoadError;

    fn try_from(repr: AutomatonRepr) -> Result<Self, Self::Error> {
        if repr.version != FORMAT_VERSION {
            return Err(LoadError::Version {
                found: repr.version,
                expected: FORMAT_VERSION,
            });
        }

        let symbol_count = repr.symbols.len();
        let terminal_count = repr.terminal_count;
        let state_count = repr.states.len();
        let production_count = repr.productions.len();
        let invalid = |what: String| Err(LoadError::Invalid(what));

        if terminal_count < SyntaxKind::RESERVED as usize || terminal_count > symbol_count {
            return invalid(format!("terminal count {terminal_count} out of range"));
        }
        if repr.tokens.len() != terminal_count {
            return invalid(format!(
                "{} token matchers for {terminal_count} terminals",
                repr.tokens.len()
            ));
        }
        if repr.start.index() < terminal_count || repr.start.index() >= symbol_count {
            return invalid(format!("start symbol {} is not a non-terminal", repr.start));
        }
        for production in &repr.productions {
            let in_range = production.lhs.index() >= terminal_count
                && production.lhs.index() < symbol_count
                && production.rhs.iter().all(|kind| kind.index() < symbol_count)
                && production.fields.len() == production.rhs.len();
            if !in_range {
                return invalid(format!("production for {} is malformed", production.lhs));
            }
        }

        let matchers = repr
            .tokens
            .into_iter()
            .zip(&repr.symbols)
            .map(|(matcher, symbol)| match matcher {
                None => Ok(None),
                Some(MatcherRepr::Literal(text)) => Ok(Some(TokenMatcher::Literal(text))),
                Some(MatcherRepr::Pattern(source)) => TokenMatcher::pattern(source)
                    .map(Some)
                    .map_err(|source| LoadError::Pattern {
                        name: symbol.name.clone(),
                        source,
                    }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut table = ParseTable::new(state_count, terminal_count, symbol_count - terminal_count);
        for (state, row) in repr.states.iter().enumerate() {
            let state = state as u32;
            for &(terminal, raw) in &row.actions {
                let action = decode_action(raw);
                let target_ok = match action {
                    Action::Shift(target) => (target as usize) < state_count,
                    Action::Reduce(production) => (production as usize) < production_count,
                    Action::Accept | Action::Error => true,
                };
                if terminal as usize >= terminal_count || !target_ok {
                    return invalid(format!("bad action in state {state}"));
                }
                table.set_action(state, SyntaxKind(terminal), action);
            }
            for &(nonterminal, target) in &row.gotos {
                let column_ok = (nonterminal as usize) >= terminal_count
                    && (nonterminal as usize) < symbol_count;
                if !column_ok || target as usize >= state_count {
                    return invalid(format!("bad goto in state {state}"));
                }
                table.set_goto(state, SyntaxKind(nonterminal), target);
            }
        }
        table.compute_lex_modes();

        Ok(Automaton::from_parts(AutomatonParts {
            name: repr.name,
            symbols: repr.symbols,
            terminal_count,
            productions: repr.productions,
            table,
            matchers,
            start: repr.start,
        }))
    }
}

impl Serialize for Automaton {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        AutomatonRepr::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Automaton {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = AutomatonRepr::deserialize(deserializer)?;
        Automaton::try_from(repr).map_err(serde::de::Error::custom)
    }
}

impl Automaton {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&AutomatonRepr::from(self))
    }

    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let repr: AutomatonRepr = serde_json::from_str(json)?;
        Self::try_from(repr)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = self.to_json().map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
