//! EBNF rule expressions.
//!
//! The constructors mirror the combinators of tree-sitter's grammar DSL so a
//! grammar can be written directly in Rust:
//!
//! ```ignore
//! use polytope::grammar::Rule;
//!
//! let expr = Rule::choice([
//!     Rule::prec_left(1, Rule::seq([Rule::sym("expr"), Rule::lit("+"), Rule::sym("expr")])),
//!     Rule::sym("number"),
//! ]);
//! ```

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;

/// Associativity of a production, used to break equal-precedence
/// shift/reduce conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Assoc {
    Left,
    Right,
    #[default]
    None,
}

/// A precedence level plus associativity. Higher levels bind tighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Precedence {
    pub level: i32,
    pub assoc: Assoc,
}

impl Precedence {
    pub fn new(level: i32, assoc: Assoc) -> Self {
        Self { level, assoc }
    }
}

/// An EBNF expression forming the body of a grammar rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Rule {
    /// The empty sequence
    Blank,
    /// An anonymous token matching exactly this text
    Literal(SmolStr),
    /// Reference to a rule or a named token
    Symbol(SmolStr),
    Seq(Vec<Rule>),
    Choice(Vec<Rule>),
    Optional(Box<Rule>),
    /// Zero or more
    Repeat(Box<Rule>),
    /// One or more
    Repeat1(Box<Rule>),
    Prec(Precedence, Box<Rule>),
    Field(SmolStr, Box<Rule>),
    /// The catch-all recovery symbol
    Error,
}

impl Rule {
    pub fn lit(text: impl Into<SmolStr>) -> Self {
        Self::Literal(text.into())
    }

    pub fn sym(name: impl Into<SmolStr>) -> Self {
        Self::Symbol(name.into())
    }

    pub fn seq(items: impl IntoIterator<Item = Rule>) -> Self {
        let mut items: Vec<_> = items.into_iter().collect();
        match items.len() {
            0 => Self::Blank,
            1 => items.pop().unwrap_or(Self::Blank),
            _ => Self::Seq(items),
        }
    }

    pub fn choice(items: impl IntoIterator<Item = Rule>) -> Self {
        let mut items: Vec<_> = items.into_iter().collect();
        match items.len() {
            0 => Self::Blank,
            1 => items.pop().unwrap_or(Self::Blank),
            _ => Self::Choice(items),
        }
    }

    pub fn optional(rule: Rule) -> Self {
        Self::Optional(Box::new(rule))
    }

    pub fn repeat(rule: Rule) -> Self {
        Self::Repeat(Box::new(rule))
    }

    pub fn repeat1(rule: Rule) -> Self {
        Self::Repeat1(Box::new(rule))
    }

    /// `rule (separator rule)*`
    pub fn sep1(rule: Rule, separator: Rule) -> Self {
        Self::seq([rule.clone(), Self::repeat(Self::seq([separator, rule]))])
    }

    /// `(rule (separator rule)*)?`
    pub fn sep(rule: Rule, separator: Rule) -> Self {
        Self::optional(Self::sep1(rule, separator))
    }

    pub fn field(name: impl Into<SmolStr>, rule: Rule) -> Self {
        Self::Field(name.into(), Box::new(rule))
    }

    pub fn prec(level: i32, rule: Rule) -> Self {
        Self::Prec(Precedence::new(level, Assoc::None), Box::new(rule))
    }

    pub fn prec_left(level: i32, rule: Rule) -> Self {
        Self::Prec(Precedence::new(level, Assoc::Left), Box::new(rule))
    }

    pub fn prec_right(level: i32, rule: Rule) -> Self {
        Self::Prec(Precedence::new(level, Assoc::Right), Box::new(rule))
    }

    /// Visit this expression and all nested expressions in pre-order.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Rule)) {
        f(self);
        match self {
            Self::Seq(items) | Self::Choice(items) => items.iter().for_each(|item| item.walk(f)),
            Self::Optional(inner)
            | Self::Repeat(inner)
            | Self::Repeat1(inner)
            | Self::Prec(_, inner)
            | Self::Field(_, inner) => inner.walk(f),
            Self::Blank | Self::Literal(_) | Self::Symbol(_) | Self::Error => {}
        }
    }

    /// Names of every symbol this expression references, in order.
    pub fn referenced_symbols(&self) -> Vec<&SmolStr> {
        let mut out = Vec::new();
        self.walk(&mut |rule| {
            if let Self::Symbol(name) = rule {
                out.push(name);
            }
        });
        out
    }

    /// Text of every inline literal, in order.
    pub fn literals(&self) -> Vec<&SmolStr> {
        let mut out = Vec::new();
        self.walk(&mut |rule| {
            if let Self::Literal(text) = rule {
                out.push(text);
            }
        });
        out
    }
}

/// Renders the expression in the textual grammar syntax.
impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blank => write!(f, "()"),
            Self::Literal(text) => write!(f, "{:?}", text.as_str()),
            Self::Symbol(name) => write!(f, "{name}"),
            Self::Error => write!(f, "error"),
            Self::Seq(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    match item {
                        Self::Choice(_) | Self::Prec(..) => write!(f, "({item})")?,
                        _ => write!(f, "{item}")?,
                    }
                }
                Ok(())
            }
            Self::Choice(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Self::Optional(inner) => write_postfix(f, inner, '?'),
            Self::Repeat(inner) => write_postfix(f, inner, '*'),
            Self::Repeat1(inner) => write_postfix(f, inner, '+'),
            Self::Prec(prec, inner) => {
                let name = match prec.assoc {
                    Assoc::Left => "left",
                    Assoc::Right => "right",
                    Assoc::None => "prec",
                };
                write!(f, "@{name}({}) {inner}", prec.level)
            }
            Self::Field(name, inner) => match **inner {
                Self::Seq(_) | Self::Choice(_) | Self::Prec(..) => write!(f, "{name}: ({inner})"),
                _ => write!(f, "{name}: {inner}"),
            },
        }
    }
}

fn write_postfix(f: &mut fmt::Formatter<'_>, inner: &Rule, op: char) -> fmt::Result {
    match inner {
        Rule::Literal(_) | Rule::Symbol(_) | Rule::Error | Rule::Blank => write!(f, "{inner}{op}"),
        _ => write!(f, "({inner}){op}"),
    }
}
