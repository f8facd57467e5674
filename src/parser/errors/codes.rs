//! Diagnostic codes
//!
//! - E01xx: input the lexer could not turn into grammar tokens
//! - E02xx: structure repaired by error recovery

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorCode {
    /// No token pattern matches at this position
    E0101,
    /// Input left unparsed because the token limit was reached
    E0102,
    /// Tokens that do not fit the grammar here
    E0201,
    /// Expected token absent
    E0202,
    /// Expected construct absent
    E0203,
    /// Recovery gave up and the whole input is one error
    E0204,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::E0101 => "E0101",
            Self::E0102 => "E0102",
            Self::E0201 => "E0201",
            Self::E0202 => "E0202",
            Self::E0203 => "E0203",
            Self::E0204 => "E0204",
        }
    }

    /// Message used when the tree offers nothing more specific.
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::E0101 => "unrecognized character",
            Self::E0102 => "input not parsed",
            Self::E0201 => "unexpected input",
            Self::E0202 => "missing token",
            Self::E0203 => "missing syntax",
            Self::E0204 => "unrecoverable syntax error",
        }
    }

    /// Raised by the lexer rather than by recovery.
    pub fn is_lexical(&self) -> bool {
        matches!(self, Self::E0101 | Self::E0102)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
