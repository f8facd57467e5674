//! Recursive-descent parser for the grammar description language.

use smol_str::SmolStr;
use text_size::TextSize;

use super::GrammarError;
use super::lexer::{DslToken, Lexeme, tokenize};
use crate::base::LineIndex;
use crate::grammar::{
    Assoc, ConflictHint, Grammar, Precedence, Prefer, Rule, RuleDef, TokenDef, TokenPattern,
};

pub(super) struct DslParser<'a> {
    source: &'a str,
    tokens: Vec<Lexeme<'a>>,
    pos: usize,
    index: LineIndex,
}

type Result<T> = std::result::Result<T, GrammarError>;

impl<'a> DslParser<'a> {
    pub(super) fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: tokenize(source),
            pos: 0,
            index: LineIndex::new(source),
        }
    }

    pub(super) fn parse(mut self) -> Result<Grammar> {
        if let Some(bad) = self.tokens.iter().find(|t| t.kind.is_none()) {
            let message = format!("unrecognized input {:?}", bad.text);
            return Err(GrammarError::at(&self.index, bad.range.start(), message));
        }

        let mut grammar = Grammar::default();
        while self.pos < self.tokens.len() {
            self.directive(&mut grammar)?;
        }
        Ok(grammar)
    }

    // =========================================================================
    // Cursor helpers
    // =========================================================================

    fn peek(&self) -> Option<DslToken> {
        self.nth(0)
    }

    fn nth(&self, n: usize) -> Option<DslToken> {
        self.tokens.get(self.pos + n).and_then(|t| t.kind)
    }

    fn at(&self, kind: DslToken) -> bool {
        self.peek() == Some(kind)
    }

    fn text(&self) -> &'a str {
        self.tokens.get(self.pos).map_or("", |t| t.text)
    }

    fn offset(&self) -> TextSize {
        match self.tokens.get(self.pos) {
            Some(token) => token.range.start(),
            None => TextSize::of(self.source),
        }
    }

    fn error<T>(&self, message: impl Into<String>) -> Result<T> {
        Err(GrammarError::at(&self.index, self.offset(), message.into()))
    }

    fn found(&self) -> String {
        match self.tokens.get(self.pos) {
            Some(token) => format!("{:?}", token.text),
            None => "end of input".to_string(),
        }
    }

    fn expect(&mut self, kind: DslToken) -> Result<&'a str> {
        if self.at(kind) {
            let text = self.text();
            self.pos += 1;
            Ok(text)
        } else {
            self.error(format!("expected {}, found {}", kind.describe(), self.found()))
        }
    }

    fn eat(&mut self, kind: DslToken) -> bool {
        if self.at(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn ident(&mut self) -> Result<SmolStr> {
        self.expect(DslToken::Ident).map(SmolStr::new)
    }

    fn ident_list(&mut self) -> Result<Vec<SmolStr>> {
        let mut names = vec![self.ident()?];
        while self.eat(DslToken::Comma) {
            names.push(self.ident()?);
        }
        Ok(names)
    }

    // =========================================================================
    // Directives
    // =========================================================================

    fn directive(&mut self, grammar: &mut Grammar) -> Result<()> {
        if !self.at(DslToken::Ident) {
            return self.error(format!("expected a directive or rule, found {}", self.found()));
        }
        if self.nth(1) == Some(DslToken::Eq) {
            let name = self.ident()?;
            self.expect(DslToken::Eq)?;
            let body = self.choice()?;
            self.expect(DslToken::Semi)?;
            grammar.rules.push(RuleDef { name, body });
            return Ok(());
        }

        match self.text() {
            "grammar" => {
                self.pos += 1;
                grammar.name = self.ident()?;
            }
            "start" => {
                self.pos += 1;
                grammar.start = Some(self.ident()?);
            }
            "extras" => {
                self.pos += 1;
                grammar.extras.extend(self.ident_list()?);
            }
            "token" => {
                self.pos += 1;
                let name = self.ident()?;
                self.expect(DslToken::Eq)?;
                let pattern = self.token_pattern()?;
                grammar.tokens.push(TokenDef { name, pattern });
            }
            "prefer" => {
                self.pos += 1;
                let prefer = match self.text() {
                    "shift" if self.at(DslToken::Ident) => Prefer::Shift,
                    "reduce" if self.at(DslToken::Ident) => Prefer::Reduce,
                    _ => return self.error(format!("expected 'shift' or 'reduce', found {}", self.found())),
                };
                self.pos += 1;
                for rule in self.ident_list()? {
                    grammar.hints.push(ConflictHint { prefer, rule });
                }
            }
            other => return self.error(format!("unknown directive {other:?}")),
        }
        self.expect(DslToken::Semi)?;
        Ok(())
    }

    fn token_pattern(&mut self) -> Result<TokenPattern> {
        match self.peek() {
            Some(DslToken::String) => {
                let text = self.string()?;
                Ok(TokenPattern::Literal(text))
            }
            Some(DslToken::Regex) => {
                let raw = self.expect(DslToken::Regex)?;
                Ok(TokenPattern::Regex(unescape_regex(&raw[1..raw.len() - 1])))
            }
            _ => self.error(format!("expected a string or /regex/, found {}", self.found())),
        }
    }

    fn string(&mut self) -> Result<SmolStr> {
        let start = self.offset();
        let raw = self.expect(DslToken::String)?;
        let text = unescape_string(&raw[1..raw.len() - 1]);
        if text.is_empty() {
            return Err(GrammarError::at(
                &self.index,
                start,
                "empty string literal".to_string(),
            ));
        }
        Ok(SmolStr::new(text))
    }

    // =========================================================================
    // Rule expressions
    // =========================================================================

    /// `alt ('|' alt)*`
    fn choice(&mut self) -> Result<Rule> {
        let mut alts = vec![self.alternative()?];
        while self.eat(DslToken::Pipe) {
            alts.push(self.alternative()?);
        }
        Ok(Rule::choice(alts))
    }

    /// `('@' assoc '(' int ')')? item*`
    fn alternative(&mut self) -> Result<Rule> {
        let prec = if self.eat(DslToken::At) {
            let assoc = match self.text() {
                "left" => Assoc::Left,
                "right" => Assoc::Right,
                "prec" => Assoc::None,
                _ => {
                    return self.error(format!(
                        "expected 'left', 'right' or 'prec', found {}",
                        self.found()
                    ));
                }
            };
            self.pos += 1;
            self.expect(DslToken::LParen)?;
            let level = self.int()?;
            self.expect(DslToken::RParen)?;
            Some(Precedence::new(level, assoc))
        } else {
            None
        };

        let mut items = Vec::new();
        while matches!(
            self.peek(),
            Some(DslToken::Ident | DslToken::String | DslToken::LParen)
        ) {
            items.push(self.item()?);
        }
        let body = Rule::seq(items);
        Ok(match prec {
            Some(prec) => Rule::Prec(prec, Box::new(body)),
            None => body,
        })
    }

    fn int(&mut self) -> Result<i32> {
        let text = self.expect(DslToken::Int)?;
        match text.parse() {
            Ok(level) => Ok(level),
            Err(_) => {
                self.pos -= 1;
                self.error(format!("precedence {text} is out of range"))
            }
        }
    }

    /// `(ident ':')? atom ('*' | '+' | '?')*`
    fn item(&mut self) -> Result<Rule> {
        if self.at(DslToken::Ident) && self.nth(1) == Some(DslToken::Colon) {
            let name = self.ident()?;
            self.pos += 1;
            let inner = self.item()?;
            return Ok(Rule::field(name, inner));
        }

        let mut rule = self.atom()?;
        loop {
            rule = if self.eat(DslToken::Star) {
                Rule::repeat(rule)
            } else if self.eat(DslToken::Plus) {
                Rule::repeat1(rule)
            } else if self.eat(DslToken::Question) {
                Rule::optional(rule)
            } else {
                return Ok(rule);
            };
        }
    }

    fn atom(&mut self) -> Result<Rule> {
        match self.peek() {
            Some(DslToken::Ident) if self.text() == "error" => {
                self.pos += 1;
                Ok(Rule::Error)
            }
            Some(DslToken::Ident) => Ok(Rule::Symbol(self.ident()?)),
            Some(DslToken::String) => Ok(Rule::Literal(self.string()?)),
            Some(DslToken::LParen) => {
                self.pos += 1;
                let inner = self.choice()?;
                self.expect(DslToken::RParen)?;
                Ok(inner)
            }
            _ => self.error(format!("expected a rule item, found {}", self.found())),
        }
    }
}

fn unescape_string(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Only `\/` is an escape of the grammar language; everything else belongs to
/// the regex itself.
fn unescape_regex(raw: &str) -> SmolStr {
    SmolStr::new(raw.replace("\\/", "/"))
}
