//! Table-driven contextual lexer
//!
//! Token definitions come from the compiled [`Automaton`]. The parser asks for
//! the next token given the terminals valid in its current state, so a keyword
//! that is not expected lexes as whatever else matches (usually an
//! identifier).

use text_size::{TextRange, TextSize};

use super::syntax_kind::SyntaxKind;
use crate::automaton::Automaton;

/// A token with its kind, text, and position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
    pub offset: TextSize,
}

impl Token<'_> {
    pub fn len(&self) -> TextSize {
        TextSize::of(self.text)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn range(&self) -> TextRange {
        TextRange::at(self.offset, self.len())
    }

    pub fn is_end(&self) -> bool {
        self.kind == SyntaxKind::END
    }
}

/// Lexer over one input, resumable from any offset
pub struct Lexer<'a> {
    automaton: &'a Automaton,
    input: &'a str,
    offset: usize,
    done: bool,
}

#[derive(Clone, Copy)]
struct Candidate {
    kind: SyntaxKind,
    len: usize,
    literal: bool,
}

impl Candidate {
    /// Longest match, then literals over patterns, then lower kinds.
    fn beats(&self, other: &Candidate) -> bool {
        (self.len, self.literal, std::cmp::Reverse(self.kind))
            > (other.len, other.literal, std::cmp::Reverse(other.kind))
    }
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str, automaton: &'a Automaton) -> Self {
        Self {
            automaton,
            input,
            offset: 0,
            done: false,
        }
    }

    pub fn input(&self) -> &'a str {
        self.input
    }

    pub fn offset(&self) -> TextSize {
        TextSize::new(self.offset as u32)
    }

    /// Resume scanning at `offset`, clamped to the input and moved forward to
    /// a character boundary.
    pub fn seek(&mut self, offset: TextSize) {
        let mut offset = usize::from(offset).min(self.input.len());
        while !self.input.is_char_boundary(offset) {
            offset += 1;
        }
        self.offset = offset;
        self.done = false;
    }

    /// Scan the next token. `valid` restricts the candidates to the terminals
    /// the parser can use (extras are always candidates); `None` means every
    /// terminal. At the end of input an empty `END` token is returned.
    pub fn next_token(&mut self, valid: Option<&[SyntaxKind]>) -> Token<'a> {
        let rest = &self.input[self.offset..];
        let offset = self.offset();
        if rest.is_empty() {
            return Token {
                kind: SyntaxKind::END,
                text: "",
                offset,
            };
        }

        let best = match valid {
            Some(valid) => self
                .scan_kinds(rest, valid.iter().chain(self.automaton.extras()).copied())
                .or_else(|| self.scan_kinds(rest, self.all_terminals())),
            None => self.scan_kinds(rest, self.all_terminals()),
        };

        let (kind, len) = match best {
            Some(candidate) => (candidate.kind, candidate.len),
            None => {
                let len = rest.chars().next().map_or(1, char::len_utf8);
                (SyntaxKind::ERROR, len)
            }
        };
        self.offset += len;
        Token {
            kind,
            text: &rest[..len],
            offset,
        }
    }

    fn all_terminals(&self) -> impl Iterator<Item = SyntaxKind> {
        (SyntaxKind::RESERVED..self.automaton.terminal_count() as u16).map(SyntaxKind)
    }

    fn scan_kinds(&self, rest: &str, kinds: impl Iterator<Item = SyntaxKind>) -> Option<Candidate> {
        let mut best: Option<Candidate> = None;
        for kind in kinds {
            let Some(matcher) = self.automaton.matcher(kind) else {
                continue;
            };
            let Some(len) = matcher.match_len(rest) else {
                continue;
            };
            let candidate = Candidate {
                kind,
                len,
                literal: matcher.is_literal(),
            };
            if best.is_none_or(|best| candidate.beats(&best)) {
                best = Some(candidate);
            }
        }
        best
    }
}

/// Lexes every terminal regardless of parser state; ends before `END`.
impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let token = self.next_token(None);
        if token.is_end() {
            self.done = true;
            return None;
        }
        Some(token)
    }
}

/// Tokenize an entire string into a Vec
pub fn tokenize<'a>(input: &'a str, automaton: &'a Automaton) -> Vec<Token<'a>> {
    Lexer::new(input, automaton).collect()
}
