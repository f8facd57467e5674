//! Shareable handles to compiled grammars.
//!
//! A [`Language`] is an `Arc<Automaton>`: cloning it is a reference count
//! bump, and one compiled table serves any number of concurrent parses.
//!
//! # Usage
//!
//! ```ignore
//! use polytope::language::GrammarCache;
//!
//! // First call compiles, later calls return the cached handle
//! let language = GrammarCache::global().get_or_compile("arith", ARITH_SOURCE)?;
//! let parse = polytope::parse("1 + 2", &language);
//! ```

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use std::fmt;
use std::sync::Arc;

use crate::automaton::Automaton;
use crate::compile::{CompileError, compile, compile_str};
use crate::grammar::Grammar;
use once_cell::sync::Lazy;

/// A compiled grammar ready for parsing.
#[derive(Clone)]
pub struct Language {
    automaton: Arc<Automaton>,
}

impl Language {
    pub fn new(automaton: Automaton) -> Self {
        Self {
            automaton: Arc::new(automaton),
        }
    }

    pub fn from_grammar(grammar: &Grammar) -> Result<Self, CompileError> {
        compile(grammar).map(Self::new)
    }

    /// Compile grammar DSL source.
    pub fn from_source(source: &str) -> Result<Self, CompileError> {
        compile_str(source).map(Self::new)
    }

    pub fn automaton(&self) -> &Automaton {
        &self.automaton
    }

    pub fn name(&self) -> &str {
        self.automaton.name()
    }

    /// Whether both handles share one compiled automaton.
    pub fn ptr_eq(&self, other: &Language) -> bool {
        Arc::ptr_eq(&self.automaton, &other.automaton)
    }
}

impl From<Automaton> for Language {
    fn from(automaton: Automaton) -> Self {
        Self::new(automaton)
    }
}

impl fmt::Debug for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Language")
            .field("name", &self.name())
            .field("states", &self.automaton.state_count())
            .field("symbols", &self.automaton.symbol_count())
            .finish()
    }
}

/// Compiled grammars keyed by grammar name.
///
/// Compilation happens outside the lock; if two threads race on the same
/// name the first insert wins and both get that handle.
#[derive(Default)]
pub struct GrammarCache {
    languages: RwLock<FxHashMap<SmolStr, Language>>,
}

static GLOBAL: Lazy<GrammarCache> = Lazy::new(GrammarCache::default);

impl GrammarCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache.
    pub fn global() -> &'static GrammarCache {
        &GLOBAL
    }

    pub fn get(&self, name: &str) -> Option<Language> {
        self.languages.read().get(name).cloned()
    }

    /// Cache `language` under its grammar name, returning the handle that
    /// ends up cached.
    pub fn insert(&self, language: Language) -> Language {
        let name = SmolStr::new(language.name());
        self.languages.write().entry(name).or_insert(language).clone()
    }

    /// The cached language called `name`, compiling `source` on a miss.
    pub fn get_or_compile(&self, name: &str, source: &str) -> Result<Language, CompileError> {
        if let Some(language) = self.get(name) {
            return Ok(language);
        }
        let language = Language::from_source(source)?;
        let mut languages = self.languages.write();
        Ok(languages.entry(SmolStr::new(name)).or_insert(language).clone())
    }

    pub fn remove(&self, name: &str) -> Option<Language> {
        self.languages.write().remove(name)
    }

    pub fn len(&self) -> usize {
        self.languages.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.read().is_empty()
    }

    pub fn clear(&self) {
        self.languages.write().clear();
    }
}
