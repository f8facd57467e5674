//! Dense LR action/goto tables.

use crate::parser::SyntaxKind;

pub type StateId = u32;
pub type ProductionId = u32;

/// The entry of the action table for one (state, lookahead) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Action {
    #[default]
    Error,
    Shift(StateId),
    Reduce(ProductionId),
    Accept,
}

impl Action {
    pub fn is_error(self) -> bool {
        matches!(self, Self::Error)
    }
}

/// Action and goto tables plus the per-state lexical modes.
///
/// Rows are indexed by state. The action table has one column per terminal,
/// the goto table one column per non-terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTable {
    pub(crate) terminal_count: usize,
    pub(crate) nonterminal_count: usize,
    pub(crate) actions: Vec<Action>,
    pub(crate) gotos: Vec<Option<StateId>>,
    /// Distinct sets of valid terminals
    pub(crate) lex_modes: Vec<Vec<SyntaxKind>>,
    /// Index into `lex_modes` for each state
    pub(crate) state_lex_modes: Vec<u32>,
}

impl ParseTable {
    pub(crate) fn new(state_count: usize, terminal_count: usize, nonterminal_count: usize) -> Self {
        Self {
            terminal_count,
            nonterminal_count,
            actions: vec![Action::Error; state_count * terminal_count],
            gotos: vec![None; state_count * nonterminal_count],
            lex_modes: Vec::new(),
            state_lex_modes: Vec::new(),
        }
    }

    pub fn state_count(&self) -> usize {
        if self.terminal_count == 0 {
            0
        } else {
            self.actions.len() / self.terminal_count
        }
    }

    /// The action for `state` on terminal `lookahead`; non-terminals and
    /// out-of-range kinds yield [`Action::Error`].
    pub fn action(&self, state: StateId, lookahead: SyntaxKind) -> Action {
        let terminal = lookahead.index();
        if terminal >= self.terminal_count {
            return Action::Error;
        }
        self.actions
            .get(state as usize * self.terminal_count + terminal)
            .copied()
            .unwrap_or_default()
    }

    pub fn goto(&self, state: StateId, nonterminal: SyntaxKind) -> Option<StateId> {
        let column = nonterminal.index().checked_sub(self.terminal_count)?;
        if column >= self.nonterminal_count {
            return None;
        }
        self.gotos
            .get(state as usize * self.nonterminal_count + column)
            .copied()
            .flatten()
    }

    /// Terminals with a non-error action in `state`, reserved kinds excluded.
    pub fn valid_terminals(&self, state: StateId) -> &[SyntaxKind] {
        self.state_lex_modes
            .get(state as usize)
            .and_then(|&mode| self.lex_modes.get(mode as usize))
            .map_or(&[], Vec::as_slice)
    }

    pub(crate) fn set_action(&mut self, state: StateId, terminal: SyntaxKind, action: Action) {
        let index = state as usize * self.terminal_count + terminal.index();
        self.actions[index] = action;
    }

    pub(crate) fn set_goto(&mut self, state: StateId, nonterminal: SyntaxKind, target: StateId) {
        let column = nonterminal.index() - self.terminal_count;
        self.gotos[state as usize * self.nonterminal_count + column] = Some(target);
    }

    /// Derive the lexical modes from the filled action table.
    pub(crate) fn compute_lex_modes(&mut self) {
        let mut modes: indexmap::IndexSet<Vec<SyntaxKind>> = indexmap::IndexSet::new();
        let mut state_modes = Vec::with_capacity(self.state_count());
        for row in self.actions.chunks(self.terminal_count.max(1)) {
            let valid: Vec<SyntaxKind> = row
                .iter()
                .enumerate()
                .skip(SyntaxKind::RESERVED as usize)
                .filter(|(_, action)| !action.is_error())
                .map(|(terminal, _)| SyntaxKind(terminal as u16))
                .collect();
            let (mode, _) = modes.insert_full(valid);
            state_modes.push(mode as u32);
        }
        self.lex_modes = modes.into_iter().collect();
        self.state_lex_modes = state_modes;
    }
}
