//! Grammar description model.
//!
//! A [`Grammar`] is the input of the table compiler: ordered rule definitions
//! in EBNF form, token definitions, extras and conflict hints. It can be built
//! in Rust with the [`Rule`] combinators or read from the textual grammar
//! language in [`dsl`].

pub mod dsl;
mod rule;

pub use dsl::GrammarError;
pub use rule::{Assoc, Precedence, Rule};

use smol_str::SmolStr;
use std::str::FromStr;

/// How a named token is recognised.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TokenPattern {
    /// Exact text
    Literal(SmolStr),
    /// A regular expression in `regex` crate syntax
    Regex(SmolStr),
}

impl TokenPattern {
    pub fn literal(text: impl Into<SmolStr>) -> Self {
        Self::Literal(text.into())
    }

    pub fn regex(pattern: impl Into<SmolStr>) -> Self {
        Self::Regex(pattern.into())
    }
}

/// Which action to keep when a shift/reduce conflict involving a rule cannot
/// be settled by precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prefer {
    Shift,
    Reduce,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConflictHint {
    pub prefer: Prefer,
    /// The rule whose reduction takes part in the conflict
    pub rule: SmolStr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDef {
    pub name: SmolStr,
    pub body: Rule,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenDef {
    pub name: SmolStr,
    pub pattern: TokenPattern,
}

/// A context-free grammar with token definitions.
///
/// Definitions keep their declaration order; it decides symbol numbering and
/// breaks reduce/reduce ties. Duplicate names are accepted here and rejected
/// by the compiler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grammar {
    pub name: SmolStr,
    /// Start rule; the first rule when unset
    pub start: Option<SmolStr>,
    pub rules: Vec<RuleDef>,
    pub tokens: Vec<TokenDef>,
    /// Tokens that may appear between any two tokens
    pub extras: Vec<SmolStr>,
    pub hints: Vec<ConflictHint>,
}

impl Grammar {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn start(mut self, rule: impl Into<SmolStr>) -> Self {
        self.start = Some(rule.into());
        self
    }

    pub fn rule(mut self, name: impl Into<SmolStr>, body: Rule) -> Self {
        self.rules.push(RuleDef {
            name: name.into(),
            body,
        });
        self
    }

    pub fn token(mut self, name: impl Into<SmolStr>, pattern: TokenPattern) -> Self {
        self.tokens.push(TokenDef {
            name: name.into(),
            pattern,
        });
        self
    }

    pub fn extra(mut self, token: impl Into<SmolStr>) -> Self {
        self.extras.push(token.into());
        self
    }

    pub fn prefer(mut self, prefer: Prefer, rule: impl Into<SmolStr>) -> Self {
        self.hints.push(ConflictHint {
            prefer,
            rule: rule.into(),
        });
        self
    }

    /// The effective start rule name.
    pub fn start_rule(&self) -> Option<&SmolStr> {
        self.start
            .as_ref()
            .or_else(|| self.rules.first().map(|def| &def.name))
    }

    pub fn find_rule(&self, name: &str) -> Option<&Rule> {
        self.rules
            .iter()
            .find(|def| def.name == name)
            .map(|def| &def.body)
    }

    pub fn find_token(&self, name: &str) -> Option<&TokenPattern> {
        self.tokens
            .iter()
            .find(|def| def.name == name)
            .map(|def| &def.pattern)
    }
}

impl FromStr for Grammar {
    type Err = GrammarError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        dsl::parse(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_declaration_order() {
        let grammar = Grammar::new("arith")
            .extra("ws")
            .token("ws", TokenPattern::regex(r"\s+"))
            .token("number", TokenPattern::regex("[0-9]+"))
            .rule("expr", Rule::sym("term"))
            .rule("term", Rule::sym("number"));

        assert_eq!(grammar.start_rule().map(|s| s.as_str()), Some("expr"));
        let names: Vec<_> = grammar.rules.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["expr", "term"]);
        assert_eq!(
            grammar.find_token("number"),
            Some(&TokenPattern::regex("[0-9]+"))
        );
    }

    #[test]
    fn test_explicit_start_overrides_first_rule() {
        let grammar = Grammar::new("g")
            .start("b")
            .rule("a", Rule::lit("x"))
            .rule("b", Rule::sym("a"));
        assert_eq!(grammar.start_rule().map(|s| s.as_str()), Some("b"));
        assert!(grammar.find_rule("c").is_none());
    }
}
