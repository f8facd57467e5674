//! Grammar compilation errors

use smol_str::SmolStr;
use std::fmt;
use thiserror::Error;

use crate::automaton::StateId;
use crate::grammar::GrammarError;

/// An ambiguity the compiler could not settle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub state: StateId,
    /// Name of the lookahead terminal
    pub lookahead: SmolStr,
    /// The production that would be reduced
    pub reduce: String,
    /// A production whose item shifts the lookahead
    pub shift: String,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "state {} on {}: reduce `{}` or shift in `{}`",
            self.state, self.lookahead, self.reduce, self.shift
        )
    }
}

fn list_conflicts(conflicts: &[Conflict]) -> String {
    conflicts
        .iter()
        .map(|c| format!("\n  {c}"))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("grammar syntax error at {0}")]
    Syntax(#[from] GrammarError),

    #[error("grammar defines no rules")]
    NoRules,

    #[error("start rule `{0}` is not defined")]
    UndefinedStart(SmolStr),

    #[error("undefined symbol `{name}` referenced in rule `{rule}`")]
    UndefinedSymbol { name: SmolStr, rule: SmolStr },

    #[error("`{0}` is defined more than once")]
    Duplicate(SmolStr),

    #[error("`{0}` is a reserved name")]
    ReservedName(SmolStr),

    #[error("extra `{0}` must be a declared token that no rule references")]
    InvalidExtra(SmolStr),

    #[error("conflict hint names unknown rule `{0}`")]
    UnknownHintRule(SmolStr),

    #[error("invalid pattern for token `{name}`: {message}")]
    InvalidPattern { name: SmolStr, message: String },

    #[error("token `{0}` matches the empty string")]
    EmptyToken(SmolStr),

    #[error("rule `{rule}` expands to more than {limit} alternatives")]
    TooManyAlternatives { rule: SmolStr, limit: usize },

    #[error("grammar needs {0} symbols, more than the supported maximum")]
    TooManySymbols(usize),

    #[error("{} unresolved conflict(s):{}", .0.len(), list_conflicts(.0))]
    Conflicts(Vec<Conflict>),
}
