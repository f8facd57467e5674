//! Action emission and conflict resolution.
//!
//! For each (state, lookahead) the candidate actions are settled in order by
//! precedence, by the associativity of the reduced production, by declaration
//! order between reductions, and finally by `prefer` hints. Whatever remains
//! is reported as a [`Conflict`].

use std::cmp::Reverse;

use indexmap::IndexMap;
use tracing::debug;

use super::error::{CompileError, Conflict};
use super::flatten::FlatGrammar;
use super::item_sets::{ClosureContext, ItemSets};
use crate::automaton::{
    Action, ParseTable, ProductionId, StateId, display_production, symbol_label,
};
use crate::grammar::{Assoc, Prefer};
use crate::parser::SyntaxKind;

/// Everything that could happen in one state on one lookahead.
#[derive(Default)]
struct Candidates {
    /// `Shift` or `Accept`
    shift: Option<Action>,
    /// Productions whose items shift this lookahead
    shifting: Vec<ProductionId>,
    reduces: Vec<ProductionId>,
}

pub(crate) fn build_table(
    grammar: &FlatGrammar,
    context: &ClosureContext<'_>,
    sets: &ItemSets,
) -> Result<ParseTable, CompileError> {
    let mut table = ParseTable::new(
        sets.kernels.len(),
        grammar.terminal_count,
        grammar.nonterminal_count(),
    );
    let mut conflicts = Vec::new();

    for (state, kernel) in sets.kernels.iter().enumerate() {
        let state = state as StateId;
        let transitions = &sets.transitions[state as usize];
        let mut candidates: IndexMap<SyntaxKind, Candidates> = IndexMap::new();

        for (item, lookahead) in context.closure(kernel) {
            match context.next_symbol(item) {
                Some(next) if grammar.is_terminal(next) => {
                    let Some(&(_, target)) = transitions.iter().find(|(symbol, _)| *symbol == next)
                    else {
                        continue;
                    };
                    let entry = candidates.entry(next).or_default();
                    entry.shift = Some(Action::Shift(target));
                    entry.shifting.push(item.production);
                }
                Some(_) => {}
                None if item.production == grammar.start_production => {
                    let entry = candidates.entry(SyntaxKind::END).or_default();
                    entry.shift = Some(Action::Accept);
                    entry.shifting.push(item.production);
                }
                None => {
                    for terminal in lookahead.iter() {
                        let entry = candidates.entry(terminal).or_default();
                        if !entry.reduces.contains(&item.production) {
                            entry.reduces.push(item.production);
                        }
                    }
                }
            }
        }

        for (lookahead, candidate) in candidates {
            match resolve(grammar, state, lookahead, candidate) {
                Ok(action) => table.set_action(state, lookahead, action),
                Err(conflict) => conflicts.push(conflict),
            }
        }

        for &(symbol, target) in transitions {
            if !grammar.is_terminal(symbol) {
                table.set_goto(state, symbol, target);
            }
        }
    }

    if !conflicts.is_empty() {
        return Err(CompileError::Conflicts(conflicts));
    }
    table.compute_lex_modes();
    Ok(table)
}

fn level(grammar: &FlatGrammar, production: ProductionId) -> i32 {
    grammar.productions[production as usize].prec_level()
}

fn describe(grammar: &FlatGrammar, production: ProductionId) -> String {
    display_production(&grammar.symbols, &grammar.productions[production as usize])
}

fn resolve(
    grammar: &FlatGrammar,
    state: StateId,
    lookahead: SyntaxKind,
    candidate: Candidates,
) -> Result<Action, Conflict> {
    let reduce = candidate
        .reduces
        .iter()
        .copied()
        .max_by_key(|&p| (level(grammar, p), Reverse(p)));
    if candidate.reduces.len() > 1 {
        debug!(
            state,
            lookahead = %symbol_label(&grammar.symbols, lookahead),
            kept = %reduce.map(|p| describe(grammar, p)).unwrap_or_default(),
            "reduce/reduce conflict resolved"
        );
    }

    let (shift, reduce) = match (candidate.shift, reduce) {
        (Some(shift), None) => return Ok(shift),
        (None, Some(reduce)) => return Ok(Action::Reduce(reduce)),
        (None, None) => return Ok(Action::Error),
        (Some(shift), Some(reduce)) => (shift, reduce),
    };

    let shift_level = candidate
        .shifting
        .iter()
        .map(|&p| level(grammar, p))
        .max()
        .unwrap_or(0);
    let reduce_level = level(grammar, reduce);
    let production = &grammar.productions[reduce as usize];

    let prefer = if reduce_level > shift_level {
        Some(Prefer::Reduce)
    } else if reduce_level < shift_level {
        Some(Prefer::Shift)
    } else {
        match production.prec.map(|p| p.assoc) {
            Some(Assoc::Left) => Some(Prefer::Reduce),
            Some(Assoc::Right) => Some(Prefer::Shift),
            _ => grammar.hints.get(&production.lhs).copied().or_else(|| {
                candidate.shifting.iter().find_map(|&p| {
                    grammar
                        .hints
                        .get(&grammar.productions[p as usize].lhs)
                        .copied()
                })
            }),
        }
    };

    match prefer {
        Some(prefer) => {
            debug!(
                state,
                lookahead = %symbol_label(&grammar.symbols, lookahead),
                reduce = %describe(grammar, reduce),
                ?prefer,
                "shift/reduce conflict resolved"
            );
            Ok(match prefer {
                Prefer::Shift => shift,
                Prefer::Reduce => Action::Reduce(reduce),
            })
        }
        None => Err(Conflict {
            state,
            lookahead: symbol_label(&grammar.symbols, lookahead).into(),
            reduce: describe(grammar, reduce),
            shift: candidate
                .shifting
                .first()
                .map(|&p| describe(grammar, p))
                .unwrap_or_default(),
        }),
    }
}
