//! Nullable and FIRST sets.

use std::fmt;

use super::flatten::FlatGrammar;
use crate::parser::SyntaxKind;

/// A set of terminals, stored as a bitset.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub(crate) struct TermSet {
    words: Vec<u64>,
}

impl TermSet {
    pub fn with_capacity(terminal_count: usize) -> Self {
        Self {
            words: vec![0; terminal_count.div_ceil(64)],
        }
    }

    pub fn single(terminal_count: usize, kind: SyntaxKind) -> Self {
        let mut set = Self::with_capacity(terminal_count);
        set.insert(kind);
        set
    }

    pub fn insert(&mut self, kind: SyntaxKind) -> bool {
        let (word, bit) = (kind.index() / 64, kind.index() % 64);
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        let before = self.words[word];
        self.words[word] |= 1 << bit;
        before != self.words[word]
    }

    pub fn contains(&self, kind: SyntaxKind) -> bool {
        let (word, bit) = (kind.index() / 64, kind.index() % 64);
        self.words.get(word).is_some_and(|w| w & (1 << bit) != 0)
    }

    /// Union `other` into `self`; returns whether anything was added.
    pub fn union_with(&mut self, other: &TermSet) -> bool {
        if other.words.len() > self.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        let mut changed = false;
        for (mine, theirs) in self.words.iter_mut().zip(&other.words) {
            let merged = *mine | theirs;
            changed |= merged != *mine;
            *mine = merged;
        }
        changed
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    pub fn iter(&self) -> impl Iterator<Item = SyntaxKind> + '_ {
        self.words.iter().enumerate().flat_map(|(i, &word)| {
            (0..64)
                .filter(move |bit| word & (1 << bit) != 0)
                .map(move |bit| SyntaxKind((i * 64 + bit) as u16))
        })
    }
}

impl fmt::Debug for TermSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(|k| k.0)).finish()
    }
}

/// Nullable flags and FIRST sets for every non-terminal.
pub(crate) struct FirstSets {
    terminal_count: usize,
    nullable: Vec<bool>,
    first: Vec<TermSet>,
}

impl FirstSets {
    pub fn compute(grammar: &FlatGrammar) -> Self {
        let terminal_count = grammar.terminal_count;
        let mut sets = Self {
            terminal_count,
            nullable: vec![false; grammar.nonterminal_count()],
            first: vec![TermSet::with_capacity(terminal_count); grammar.nonterminal_count()],
        };

        let mut changed = true;
        while changed {
            changed = false;
            for production in &grammar.productions {
                let column = production.lhs.index() - terminal_count;
                let first = sets.first_of(&production.rhs);
                let nullable = sets.is_nullable(&production.rhs);
                changed |= sets.first[column].union_with(&first);
                if nullable && !sets.nullable[column] {
                    sets.nullable[column] = true;
                    changed = true;
                }
            }
        }
        sets
    }

    fn column(&self, kind: SyntaxKind) -> Option<usize> {
        kind.index().checked_sub(self.terminal_count)
    }

    pub fn is_nullable(&self, symbols: &[SyntaxKind]) -> bool {
        symbols
            .iter()
            .all(|&kind| self.column(kind).is_some_and(|c| self.nullable[c]))
    }

    /// FIRST of a symbol sequence, not including the follow context.
    pub fn first_of(&self, symbols: &[SyntaxKind]) -> TermSet {
        let mut out = TermSet::with_capacity(self.terminal_count);
        for &kind in symbols {
            match self.column(kind) {
                None => {
                    out.insert(kind);
                    return out;
                }
                Some(column) => {
                    out.union_with(&self.first[column]);
                    if !self.nullable[column] {
                        return out;
                    }
                }
            }
        }
        out
    }

    /// FIRST(`symbols` `follow`).
    pub fn first_with_follow(&self, symbols: &[SyntaxKind], follow: &TermSet) -> TermSet {
        let mut out = self.first_of(symbols);
        if self.is_nullable(symbols) {
            out.union_with(follow);
        }
        out
    }
}
