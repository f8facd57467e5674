//! EBNF to BNF flattening and symbol numbering.
//!
//! Choices and optionals expand into alternative productions, repetitions
//! become left-recursive auxiliary rules shared across the grammar, fields
//! and precedence are pushed down onto the generated productions.

use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::{SmolStr, format_smolstr};

use super::CompileError;
use crate::automaton::{Production, ProductionId, SymbolKind, SymbolMetadata, TokenMatcher};
use crate::grammar::{Grammar, Precedence, Prefer, Rule, TokenPattern};
use crate::parser::SyntaxKind;

/// Upper bound on the alternatives a single rule may expand to.
pub(crate) const MAX_ALTERNATIVES: usize = 4096;

const RESERVED_NAMES: [&str; 3] = ["end", "ERROR", "error"];

/// A grammar in BNF form with numbered symbols.
#[derive(Debug, Clone)]
pub(crate) struct FlatGrammar {
    pub name: SmolStr,
    pub symbols: Vec<SymbolMetadata>,
    pub terminal_count: usize,
    pub productions: Vec<Production>,
    pub matchers: Vec<Option<TokenMatcher>>,
    /// The user start rule
    pub start: SyntaxKind,
    /// `$start -> start`
    pub start_production: ProductionId,
    pub hints: FxHashMap<SyntaxKind, Prefer>,
}

impl FlatGrammar {
    pub fn nonterminal_count(&self) -> usize {
        self.symbols.len() - self.terminal_count
    }

    pub fn is_terminal(&self, kind: SyntaxKind) -> bool {
        kind.index() < self.terminal_count
    }

    /// Productions grouped by left-hand side, indexed by non-terminal column.
    pub fn productions_by_lhs(&self) -> Vec<Vec<ProductionId>> {
        let mut by_lhs = vec![Vec::new(); self.nonterminal_count()];
        for (id, production) in self.productions.iter().enumerate() {
            by_lhs[production.lhs.index() - self.terminal_count].push(id as ProductionId);
        }
        by_lhs
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Alternative {
    symbols: Vec<SyntaxKind>,
    fields: Vec<Option<SmolStr>>,
    prec: Option<Precedence>,
}

impl Alternative {
    fn single(kind: SyntaxKind) -> Self {
        Self {
            symbols: vec![kind],
            fields: vec![None],
            prec: None,
        }
    }

    fn concat(&self, other: &Alternative) -> Self {
        let mut symbols = self.symbols.clone();
        symbols.extend_from_slice(&other.symbols);
        let mut fields = self.fields.clone();
        fields.extend_from_slice(&other.fields);
        Self {
            symbols,
            fields,
            prec: self.prec.or(other.prec),
        }
    }
}

struct Flattener<'g> {
    grammar: &'g Grammar,
    names: FxHashMap<SmolStr, SyntaxKind>,
    literals: FxHashMap<SmolStr, SyntaxKind>,
    extras: FxHashSet<SyntaxKind>,
    symbols: Vec<SymbolMetadata>,
    productions: Vec<Production>,
    repeats: FxHashMap<Rule, SyntaxKind>,
    current: SmolStr,
    repeat_count: usize,
}

pub(crate) fn flatten(grammar: &Grammar) -> Result<FlatGrammar, CompileError> {
    if grammar.rules.is_empty() {
        return Err(CompileError::NoRules);
    }

    let mut seen = FxHashSet::default();
    let definitions = grammar
        .tokens
        .iter()
        .map(|def| &def.name)
        .chain(grammar.rules.iter().map(|def| &def.name));
    for name in definitions {
        if RESERVED_NAMES.contains(&name.as_str()) || name.starts_with('$') {
            return Err(CompileError::ReservedName(name.clone()));
        }
        if !seen.insert(name.clone()) {
            return Err(CompileError::Duplicate(name.clone()));
        }
    }

    let start_name = grammar.start_rule().cloned().unwrap_or_default();
    if grammar.find_rule(&start_name).is_none() {
        return Err(CompileError::UndefinedStart(start_name));
    }

    for extra in &grammar.extras {
        let referenced = grammar
            .rules
            .iter()
            .any(|def| def.body.referenced_symbols().contains(&extra));
        if grammar.find_token(extra).is_none() || referenced {
            return Err(CompileError::InvalidExtra(extra.clone()));
        }
    }

    let mut flattener = Flattener {
        grammar,
        names: FxHashMap::default(),
        literals: FxHashMap::default(),
        extras: FxHashSet::default(),
        symbols: Vec::new(),
        productions: Vec::new(),
        repeats: FxHashMap::default(),
        current: SmolStr::default(),
        repeat_count: 0,
    };
    let matchers = flattener.number_terminals()?;
    let terminal_count = flattener.symbols.len();
    flattener.number_rules();

    for def in &grammar.rules {
        flattener.current = def.name.clone();
        flattener.repeat_count = 0;
        let lhs = flattener.names[&def.name];
        let mut alternatives = flattener.expand(&def.body)?;
        dedup_preserving_order(&mut alternatives);
        for alternative in alternatives {
            flattener.push_production(lhs, alternative);
        }
    }

    let start = flattener.names[&start_name];
    let augmented = flattener.push_symbol(SymbolMetadata {
        name: SmolStr::new_static("$start"),
        kind: SymbolKind::Start,
        visible: false,
        named: false,
        extra: false,
    });
    let start_production = flattener.productions.len() as ProductionId;
    flattener.push_production(augmented, Alternative::single(start));

    if flattener.symbols.len() > SyntaxKind::MAX as usize {
        return Err(CompileError::TooManySymbols(flattener.symbols.len()));
    }

    let mut hints = FxHashMap::default();
    for hint in &grammar.hints {
        match flattener.names.get(&hint.rule) {
            Some(&kind) if kind.index() >= terminal_count => {
                hints.insert(kind, hint.prefer);
            }
            _ => return Err(CompileError::UnknownHintRule(hint.rule.clone())),
        }
    }

    Ok(FlatGrammar {
        name: grammar.name.clone(),
        symbols: flattener.symbols,
        terminal_count,
        productions: flattener.productions,
        matchers,
        start,
        start_production,
        hints,
    })
}

impl Flattener<'_> {
    fn push_symbol(&mut self, symbol: SymbolMetadata) -> SyntaxKind {
        let kind = SyntaxKind(self.symbols.len().min(u16::MAX as usize) as u16);
        self.symbols.push(symbol);
        kind
    }

    fn push_production(&mut self, lhs: SyntaxKind, alternative: Alternative) {
        self.productions.push(Production {
            lhs,
            rhs: alternative.symbols,
            fields: alternative.fields,
            prec: alternative.prec,
        });
    }

    /// Reserved kinds, named tokens, then inline literals.
    fn number_terminals(&mut self) -> Result<Vec<Option<TokenMatcher>>, CompileError> {
        let reserved = [
            ("end", SymbolKind::End, false),
            ("ERROR", SymbolKind::Error, true),
            ("error", SymbolKind::ErrorSymbol, false),
        ];
        for (name, kind, visible) in reserved {
            self.push_symbol(SymbolMetadata {
                name: SmolStr::new_static(name),
                kind,
                visible,
                named: true,
                extra: false,
            });
        }
        let mut matchers = vec![None, None, None];

        let grammar = self.grammar;
        for def in &grammar.tokens {
            let matcher = match &def.pattern {
                TokenPattern::Literal(text) if text.is_empty() => {
                    return Err(CompileError::EmptyToken(def.name.clone()));
                }
                TokenPattern::Literal(text) => TokenMatcher::Literal(text.clone()),
                TokenPattern::Regex(source) => {
                    let matcher = TokenMatcher::pattern(source.clone()).map_err(|err| {
                        CompileError::InvalidPattern {
                            name: def.name.clone(),
                            message: err.to_string(),
                        }
                    })?;
                    if matcher.matches_empty() {
                        return Err(CompileError::EmptyToken(def.name.clone()));
                    }
                    matcher
                }
            };
            let extra = grammar.extras.contains(&def.name);
            let kind = self.push_symbol(SymbolMetadata {
                name: def.name.clone(),
                kind: SymbolKind::Token,
                visible: !def.name.starts_with('_'),
                named: true,
                extra,
            });
            if extra {
                self.extras.insert(kind);
            }
            self.names.insert(def.name.clone(), kind);
            if let TokenPattern::Literal(text) = &def.pattern {
                self.literals.entry(text.clone()).or_insert(kind);
            }
            matchers.push(Some(matcher));
        }

        for def in &grammar.rules {
            for text in def.body.literals() {
                if text.is_empty() {
                    return Err(CompileError::EmptyToken(def.name.clone()));
                }
                if self.literals.contains_key(text) {
                    continue;
                }
                let kind = self.push_symbol(SymbolMetadata {
                    name: text.clone(),
                    kind: SymbolKind::Literal,
                    visible: true,
                    named: false,
                    extra: false,
                });
                self.literals.insert(text.clone(), kind);
                matchers.push(Some(TokenMatcher::Literal(text.clone())));
            }
        }
        Ok(matchers)
    }

    fn number_rules(&mut self) {
        let grammar = self.grammar;
        for def in &grammar.rules {
            let kind = self.push_symbol(SymbolMetadata {
                name: def.name.clone(),
                kind: SymbolKind::Rule,
                visible: !def.name.starts_with('_'),
                named: true,
                extra: false,
            });
            self.names.insert(def.name.clone(), kind);
        }
    }

    fn check_limit(&self, alternatives: &[Alternative]) -> Result<(), CompileError> {
        if alternatives.len() > MAX_ALTERNATIVES {
            return Err(CompileError::TooManyAlternatives {
                rule: self.current.clone(),
                limit: MAX_ALTERNATIVES,
            });
        }
        Ok(())
    }

    fn expand(&mut self, rule: &Rule) -> Result<Vec<Alternative>, CompileError> {
        match rule {
            Rule::Blank => Ok(vec![Alternative::default()]),
            Rule::Error => Ok(vec![Alternative::single(SyntaxKind::ERROR_SYMBOL)]),
            Rule::Literal(text) => {
                let kind = self.literals[text];
                Ok(vec![Alternative::single(kind)])
            }
            Rule::Symbol(name) => match self.names.get(name) {
                Some(kind) if self.extras.contains(kind) => {
                    Err(CompileError::InvalidExtra(name.clone()))
                }
                Some(&kind) => Ok(vec![Alternative::single(kind)]),
                None => Err(CompileError::UndefinedSymbol {
                    name: name.clone(),
                    rule: self.current.clone(),
                }),
            },
            Rule::Seq(items) => {
                let mut product = vec![Alternative::default()];
                for item in items {
                    let expanded = self.expand(item)?;
                    if product.len().saturating_mul(expanded.len()) > MAX_ALTERNATIVES {
                        return Err(CompileError::TooManyAlternatives {
                            rule: self.current.clone(),
                            limit: MAX_ALTERNATIVES,
                        });
                    }
                    product = product
                        .iter()
                        .flat_map(|head| expanded.iter().map(|tail| head.concat(tail)))
                        .collect();
                }
                Ok(product)
            }
            Rule::Choice(items) => {
                let mut alternatives = Vec::new();
                for item in items {
                    alternatives.extend(self.expand(item)?);
                    self.check_limit(&alternatives)?;
                }
                Ok(alternatives)
            }
            Rule::Optional(inner) => {
                let mut alternatives = self.expand(inner)?;
                alternatives.push(Alternative::default());
                self.check_limit(&alternatives)?;
                Ok(alternatives)
            }
            Rule::Repeat(inner) => {
                let helper = self.repeat_helper(inner)?;
                Ok(vec![Alternative::single(helper), Alternative::default()])
            }
            Rule::Repeat1(inner) => {
                let helper = self.repeat_helper(inner)?;
                Ok(vec![Alternative::single(helper)])
            }
            Rule::Prec(prec, inner) => {
                let mut alternatives = self.expand(inner)?;
                for alternative in &mut alternatives {
                    alternative.prec.get_or_insert(*prec);
                }
                Ok(alternatives)
            }
            Rule::Field(name, inner) => {
                let mut alternatives = self.expand(inner)?;
                for alternative in &mut alternatives {
                    for field in &mut alternative.fields {
                        field.get_or_insert_with(|| name.clone());
                    }
                }
                Ok(alternatives)
            }
        }
    }

    /// `helper -> helper inner | inner`, shared by every repetition of the
    /// same expression.
    fn repeat_helper(&mut self, inner: &Rule) -> Result<SyntaxKind, CompileError> {
        if let Some(&helper) = self.repeats.get(inner) {
            return Ok(helper);
        }
        let mut body = self.expand(inner)?;
        dedup_preserving_order(&mut body);

        self.repeat_count += 1;
        let helper = self.push_symbol(SymbolMetadata {
            name: format_smolstr!("{}_repeat{}", self.current, self.repeat_count),
            kind: SymbolKind::Auxiliary,
            visible: false,
            named: false,
            extra: false,
        });
        self.repeats.insert(inner.clone(), helper);

        for alternative in &body {
            let recursive = Alternative::single(helper).concat(alternative);
            self.push_production(helper, Alternative { prec: alternative.prec, ..recursive });
        }
        for alternative in body {
            self.push_production(helper, alternative);
        }
        Ok(helper)
    }
}

fn dedup_preserving_order(alternatives: &mut Vec<Alternative>) {
    let mut unique: Vec<Alternative> = Vec::with_capacity(alternatives.len());
    for alternative in alternatives.drain(..) {
        if !unique.contains(&alternative) {
            unique.push(alternative);
        }
    }
    *alternatives = unique;
}
