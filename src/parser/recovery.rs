//! Cost-based error recovery.
//!
//! When the automaton has no action for the lookahead, a small set of repairs
//! is enumerated and each is checked by simulating the automaton on a copy of
//! the state stack over the next few tokens. The cheapest repair that lets
//! the parse continue wins:
//!
//! | repair | cost |
//! |---|---|
//! | delete `k` tokens | `k` |
//! | pop `d` entries, then insert a missing symbol | `d + 1` |
//! | pop `d` entries | `d` |
//! | pop `d` entries, shift `error`, skip `k` tokens | `d + k` |
//!
//! Ties prefer deletion, then shallower pops, then terminals over
//! non-terminals, then lower symbol kinds. When the upcoming tokens run into
//! the end of input, a repair also counts if further insertions complete the
//! parse, and each insertion it needs adds to its cost. Planning is a pure
//! function of the state stack and the upcoming token kinds.

use rustc_hash::FxHashSet;
use tracing::trace;

use super::syntax_kind::SyntaxKind;
use crate::automaton::{Action, Automaton, StateId, SymbolKind};

/// Bounds for the recovery search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryOptions {
    /// Most tokens a single deletion may remove
    pub max_skip: usize,
    /// Most stack entries a single repair may discard
    pub max_pop_depth: usize,
    /// Tokens that must be accepted after a repair for it to count
    pub sync_tokens: usize,
}

impl Default for RecoveryOptions {
    fn default() -> Self {
        Self {
            max_skip: 3,
            max_pop_depth: 6,
            sync_tokens: 3,
        }
    }
}

impl RecoveryOptions {
    /// Upcoming tokens the planner needs to see.
    pub fn horizon(&self) -> usize {
        self.max_skip + self.sync_tokens + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Repair {
    /// Drop the lookahead and the `count - 1` tokens after it
    Delete { count: usize },
    /// Discard `depth` entries, then push a missing `insert` if given
    PopInsert {
        depth: usize,
        insert: Option<SyntaxKind>,
    },
    /// Discard `depth` entries, shift the `error` symbol, drop `skip` tokens
    Catch { depth: usize, skip: usize },
    /// Nothing works at end of input: the whole parse becomes an error
    Truncate,
    /// Nothing works: drop the lookahead
    Skip,
}

impl Repair {
    pub fn depth(&self) -> usize {
        match *self {
            Self::PopInsert { depth, .. } | Self::Catch { depth, .. } => depth,
            Self::Delete { .. } | Self::Truncate | Self::Skip => 0,
        }
    }
}

type RankKey = (usize, u8, usize, u8, usize);

/// Most insertions a completion at end of input may need.
const MAX_COMPLETION: usize = 8;

/// Stacks one completion search may visit.
const COMPLETION_BUDGET: usize = 4096;

fn offer(best: &mut Option<(RankKey, Repair)>, key: RankKey, repair: Repair) {
    if best.as_ref().is_none_or(|(current, _)| key < *current) {
        *best = Some((key, repair));
    }
}

pub(crate) struct Planner<'a> {
    automaton: &'a Automaton,
    options: &'a RecoveryOptions,
}

impl<'a> Planner<'a> {
    pub fn new(automaton: &'a Automaton, options: &'a RecoveryOptions) -> Self {
        Self { automaton, options }
    }

    /// Pick a repair for `states` (bottom first) facing `tokens`, the
    /// lookahead followed by the next tokens; the list ends early with `END`
    /// when the input does.
    pub fn plan(&self, states: &[StateId], tokens: &[SyntaxKind]) -> Repair {
        let mut best: Option<(RankKey, Repair)> = None;

        for count in 1..=self.options.max_skip {
            if count >= tokens.len() || tokens[count - 1] == SyntaxKind::END {
                break;
            }
            let bound = self.bound(&best, count);
            if let Some(extra) = self.sync_cost(states.to_vec(), &tokens[count..], bound) {
                offer(&mut best, (count + extra, 0, 0, 0, 0), Repair::Delete { count });
            }
        }

        let max_depth = self.options.max_pop_depth.min(states.len().saturating_sub(1));
        for depth in 0..=max_depth {
            let base = &states[..states.len() - depth];
            if base.is_empty() {
                break;
            }
            if depth > 0 {
                let bound = self.bound(&best, depth);
                if let Some(extra) = self.sync_cost(base.to_vec(), tokens, bound) {
                    offer(
                        &mut best,
                        (depth + extra, 1, depth, 0, 0),
                        Repair::PopInsert { depth, insert: None },
                    );
                }
            }
            for (symbol, simulated) in self.insertable(base) {
                let bound = self.bound(&best, depth + 1);
                if let Some(extra) = self.sync_cost(simulated, tokens, bound) {
                    let terminal = u8::from(!self.automaton.is_terminal(symbol));
                    offer(
                        &mut best,
                        (depth + 1 + extra, 1, depth, terminal, symbol.index()),
                        Repair::PopInsert { depth, insert: Some(symbol) },
                    );
                }
            }
        }

        for depth in 0..states.len() {
            let base = &states[..states.len() - depth];
            if base.is_empty() {
                break;
            }
            let Some(caught) = shift_error(self.automaton, base.to_vec()) else {
                continue;
            };
            for skip in 0..=self.options.max_skip {
                if skip >= tokens.len() || (skip > 0 && tokens[skip - 1] == SyntaxKind::END) {
                    break;
                }
                let bound = self.bound(&best, depth + skip);
                if let Some(extra) = self.sync_cost(caught.clone(), &tokens[skip..], bound) {
                    offer(
                        &mut best,
                        (depth + skip + extra, 2, depth, 0, skip),
                        Repair::Catch { depth, skip },
                    );
                    break;
                }
            }
        }

        let repair = match best {
            Some((_, repair)) => repair,
            None if tokens.first() == Some(&SyntaxKind::END) => Repair::Truncate,
            None => Repair::Skip,
        };
        trace!(?repair, lookahead = ?tokens.first(), depth = states.len(), "planned recovery");
        repair
    }

    /// Most further insertions a repair costing `cost` may need and still
    /// beat the best repair so far.
    fn bound(&self, best: &Option<(RankKey, Repair)>, cost: usize) -> usize {
        match best {
            Some(((best_cost, ..), _)) => best_cost.saturating_sub(cost).min(MAX_COMPLETION),
            None => MAX_COMPLETION,
        }
    }

    /// Symbols that could be inserted as missing on top of `states`, with
    /// the stack after them.
    fn insertable(&self, states: &[StateId]) -> Vec<(SyntaxKind, Vec<StateId>)> {
        let Some(&state) = states.last() else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for (index, symbol) in self.automaton.symbols().iter().enumerate() {
            let kind = SyntaxKind(index as u16);
            let advanced = match symbol.kind {
                SymbolKind::Token | SymbolKind::Literal if !symbol.extra => {
                    shift_with(self.automaton, states.to_vec(), kind)
                }
                SymbolKind::Rule if symbol.visible => {
                    self.automaton.goto(state, kind).map(|target| {
                        let mut advanced = states.to_vec();
                        advanced.push(target);
                        advanced
                    })
                }
                _ => None,
            };
            if let Some(advanced) = advanced {
                out.push((kind, advanced));
            }
        }
        out
    }

    /// Extra cost for continuing from `states`: zero when the automaton
    /// consumes the first `sync_tokens` of `tokens`; when those run into the
    /// end of input, the fewest further insertions (at most `bound`) that
    /// complete the parse.
    fn sync_cost(&self, states: Vec<StateId>, tokens: &[SyntaxKind], bound: usize) -> Option<usize> {
        let need = self.options.sync_tokens.min(tokens.len());
        if need == 0 {
            return None;
        }
        let prefix = &tokens[..need];
        let real = prefix.iter().take_while(|&&kind| kind != SyntaxKind::END).count();
        match run(self.automaton, states, &prefix[..real]) {
            Simulation::Consumed(states) if real < prefix.len() => self.completion(states, bound),
            Simulation::Consumed(_) | Simulation::Accepted => Some(0),
            Simulation::Failed => None,
        }
    }

    /// Breadth-first search for the fewest insertions after which end of
    /// input is accepted.
    fn completion(&self, states: Vec<StateId>, bound: usize) -> Option<usize> {
        let mut seen: FxHashSet<Vec<StateId>> = FxHashSet::default();
        let mut frontier = vec![states];
        let mut visited = 0;
        for distance in 0..=bound {
            let mut next = Vec::new();
            for states in frontier {
                if simulate(self.automaton, states.clone(), &[SyntaxKind::END]) {
                    return Some(distance);
                }
                if distance == bound {
                    continue;
                }
                for (_, advanced) in self.insertable(&states) {
                    visited += 1;
                    if visited > COMPLETION_BUDGET {
                        return None;
                    }
                    if seen.insert(advanced.clone()) {
                        next.push(advanced);
                    }
                }
            }
            frontier = next;
        }
        None
    }
}

/// The stack after reducing with `kind` as the lookahead and shifting it.
pub(crate) fn shift_with(
    automaton: &Automaton,
    mut states: Vec<StateId>,
    kind: SyntaxKind,
) -> Option<Vec<StateId>> {
    let mut budget = 64 * automaton.productions().len().max(1);
    loop {
        let state = *states.last()?;
        match automaton.action(state, kind) {
            Action::Shift(target) => {
                states.push(target);
                return Some(states);
            }
            Action::Reduce(production) => {
                let production = automaton.production(production);
                if production.len() >= states.len() {
                    return None;
                }
                states.truncate(states.len() - production.len());
                let target = automaton.goto(*states.last()?, production.lhs)?;
                states.push(target);
            }
            Action::Accept | Action::Error => return None,
        }
        budget = budget.checked_sub(1)?;
    }
}

/// The stack after reducing with `error` as the lookahead and shifting it.
pub(crate) fn shift_error(automaton: &Automaton, states: Vec<StateId>) -> Option<Vec<StateId>> {
    shift_with(automaton, states, SyntaxKind::ERROR_SYMBOL)
}

enum Simulation {
    /// Every token was shifted; the stack afterwards
    Consumed(Vec<StateId>),
    Accepted,
    Failed,
}

/// Run the automaton without building a tree.
fn run(automaton: &Automaton, mut states: Vec<StateId>, tokens: &[SyntaxKind]) -> Simulation {
    let mut position = 0;
    let mut budget = 64 * (tokens.len() + 1) * automaton.productions().len().max(1);
    while position < tokens.len() {
        let Some(&state) = states.last() else {
            return Simulation::Failed;
        };
        match automaton.action(state, tokens[position]) {
            Action::Shift(target) => {
                states.push(target);
                position += 1;
            }
            Action::Reduce(production) => {
                let production = automaton.production(production);
                if production.len() >= states.len() {
                    return Simulation::Failed;
                }
                states.truncate(states.len() - production.len());
                let Some(target) = states.last().and_then(|&s| automaton.goto(s, production.lhs))
                else {
                    return Simulation::Failed;
                };
                states.push(target);
            }
            Action::Accept => return Simulation::Accepted,
            Action::Error => return Simulation::Failed,
        }
        budget = match budget.checked_sub(1) {
            Some(rest) => rest,
            None => return Simulation::Failed,
        };
    }
    Simulation::Consumed(states)
}

/// True when every token is shifted or the input is accepted.
pub(crate) fn simulate(automaton: &Automaton, states: Vec<StateId>, tokens: &[SyntaxKind]) -> bool {
    !matches!(run(automaton, states, tokens), Simulation::Failed)
}
