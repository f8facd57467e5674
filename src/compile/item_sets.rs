//! LR(1) item-set construction.
//!
//! States are built with a worklist from the augmented start item. In LALR
//! mode a new kernel whose core (items without lookaheads) matches an existing
//! state is merged into it, and the state is revisited so the added
//! lookaheads propagate to its successors.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

use super::first_sets::{FirstSets, TermSet};
use super::flatten::FlatGrammar;
use crate::automaton::{ProductionId, StateId};
use crate::parser::SyntaxKind;

/// A production with a dot position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct Item {
    pub production: ProductionId,
    pub dot: u32,
}

pub(crate) type Kernel = Vec<(Item, TermSet)>;

pub(crate) struct ItemSets {
    pub kernels: Vec<Kernel>,
    /// Outgoing edges of each state, in first-seen symbol order
    pub transitions: Vec<Vec<(SyntaxKind, StateId)>>,
}

pub(crate) struct ClosureContext<'a> {
    grammar: &'a FlatGrammar,
    first: &'a FirstSets,
    by_lhs: Vec<Vec<ProductionId>>,
}

impl<'a> ClosureContext<'a> {
    pub fn new(grammar: &'a FlatGrammar, first: &'a FirstSets) -> Self {
        Self {
            grammar,
            first,
            by_lhs: grammar.productions_by_lhs(),
        }
    }

    pub fn next_symbol(&self, item: Item) -> Option<SyntaxKind> {
        self.grammar.productions[item.production as usize]
            .rhs
            .get(item.dot as usize)
            .copied()
    }

    /// All items of a state, kernel first.
    pub fn closure(&self, kernel: &Kernel) -> Kernel {
        let mut items = kernel.clone();
        let mut index: FxHashMap<Item, usize> = items
            .iter()
            .enumerate()
            .map(|(i, (item, _))| (*item, i))
            .collect();
        let mut work: Vec<usize> = (0..items.len()).rev().collect();

        while let Some(i) = work.pop() {
            let (item, lookahead) = items[i].clone();
            let production = &self.grammar.productions[item.production as usize];
            let Some(&next) = production.rhs.get(item.dot as usize) else {
                continue;
            };
            if self.grammar.is_terminal(next) {
                continue;
            }
            let rest = &production.rhs[item.dot as usize + 1..];
            let follow = self.first.first_with_follow(rest, &lookahead);
            for &candidate in &self.by_lhs[next.index() - self.grammar.terminal_count] {
                let new_item = Item {
                    production: candidate,
                    dot: 0,
                };
                match index.get(&new_item) {
                    Some(&j) => {
                        if items[j].1.union_with(&follow) {
                            work.push(j);
                        }
                    }
                    None => {
                        index.insert(new_item, items.len());
                        work.push(items.len());
                        items.push((new_item, follow.clone()));
                    }
                }
            }
        }
        items
    }
}

fn core(kernel: &Kernel) -> Vec<Item> {
    kernel.iter().map(|(item, _)| *item).collect()
}

pub(crate) fn build(context: &ClosureContext<'_>, canonical: bool) -> ItemSets {
    let grammar = context.grammar;
    let start = vec![(
        Item {
            production: grammar.start_production,
            dot: 0,
        },
        TermSet::single(grammar.terminal_count, SyntaxKind::END),
    )];

    let mut sets = ItemSets {
        kernels: vec![start.clone()],
        transitions: vec![Vec::new()],
    };
    let mut by_core: FxHashMap<Vec<Item>, StateId> = FxHashMap::default();
    let mut by_kernel: FxHashMap<Kernel, StateId> = FxHashMap::default();
    if canonical {
        by_kernel.insert(start, 0);
    } else {
        by_core.insert(core(&start), 0);
    }

    let mut queue = VecDeque::from([0 as StateId]);
    let mut queued = vec![true];

    while let Some(state) = queue.pop_front() {
        queued[state as usize] = false;
        let closure = context.closure(&sets.kernels[state as usize]);

        let mut successors: IndexMap<SyntaxKind, Kernel> = IndexMap::new();
        for (item, lookahead) in closure {
            let Some(next) = context.next_symbol(item) else {
                continue;
            };
            let advanced = Item {
                production: item.production,
                dot: item.dot + 1,
            };
            let kernel = successors.entry(next).or_default();
            match kernel.iter_mut().find(|(existing, _)| *existing == advanced) {
                Some((_, existing)) => {
                    existing.union_with(&lookahead);
                }
                None => kernel.push((advanced, lookahead)),
            }
        }

        let mut edges = Vec::with_capacity(successors.len());
        for (symbol, mut kernel) in successors {
            kernel.sort_by_key(|(item, _)| *item);
            let existing = if canonical {
                by_kernel.get(&kernel).copied()
            } else {
                by_core.get(&core(&kernel)).copied()
            };

            let target = match existing {
                Some(target) => {
                    let mut grew = false;
                    for ((_, mine), (_, theirs)) in
                        sets.kernels[target as usize].iter_mut().zip(&kernel)
                    {
                        grew |= mine.union_with(theirs);
                    }
                    if grew && !queued[target as usize] {
                        queued[target as usize] = true;
                        queue.push_back(target);
                    }
                    target
                }
                None => {
                    let target = sets.kernels.len() as StateId;
                    if canonical {
                        by_kernel.insert(kernel.clone(), target);
                    } else {
                        by_core.insert(core(&kernel), target);
                    }
                    sets.kernels.push(kernel);
                    sets.transitions.push(Vec::new());
                    queued.push(true);
                    queue.push_back(target);
                    target
                }
            };
            edges.push((symbol, target));
        }
        sets.transitions[state as usize] = edges;
    }

    sets
}
