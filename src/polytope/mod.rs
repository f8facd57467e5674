//! The built-in Polytope grammar
//!
//! Polytope describes a programming problem in three blocks: the `input`
//! format with its `satisfies` restrictions, the `output` format, and a
//! reference `solution`:
//!
//! ```text
//! input { n: int; a: int, b: int; } satisfies { n > 0; }
//! output { answer: int; }
//! solution {
//!     var total: int = 0;
//!     for (1 <= i <= n) { total = total + a * i; }
//!     print(total);
//! }
//! ```
//!
//! The grammar is compiled on first use and kept in the global
//! [`GrammarCache`].

pub mod ast;

use crate::compile::CompileError;
use crate::language::{GrammarCache, Language};
use crate::parser::{Parse, ParseOptions, parse_with};

/// Grammar name, also the cache key.
pub const NAME: &str = "polytope";

/// Grammar source in the grammar description language.
pub const GRAMMAR: &str = include_str!("polytope.grammar");

/// The compiled Polytope language.
pub fn language() -> Result<Language, CompileError> {
    GrammarCache::global().get_or_compile(NAME, GRAMMAR)
}

/// Parse a Polytope program with default options.
pub fn parse(source: &str) -> Result<Parse, CompileError> {
    let language = language()?;
    Ok(parse_with(source, &language, &ParseOptions::default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROGRAM: &str = "input { n: int; } satisfies { n > 0; }\n\
                           output { answer: int; }\n\
                           solution { print(n * 2); }\n";

    #[test]
    fn test_grammar_compiles_without_conflicts() {
        let language = language().unwrap();
        assert_eq!(language.name(), NAME);
        assert!(language.ptr_eq(&super::language().unwrap()));
    }

    #[test]
    fn test_parse_program() {
        let parse = parse(PROGRAM).unwrap();
        assert!(parse.ok(), "{:?}", parse.errors());
        assert_eq!(parse.text(), PROGRAM);
        assert_eq!(parse.root().kind_name(), "source_file");
    }

    #[test]
    fn test_keywords_are_contextual() {
        let source = "input { input: int; } satisfies { } output { } solution { print(input); }";
        let parse = parse(source).unwrap();
        assert!(parse.ok(), "{:?}", parse.errors());
        let target = parse
            .root()
            .descendants()
            .find(|node| node.kind_name() == "io_target")
            .unwrap();
        let id = target.child_by_field_name("id").unwrap();
        assert_eq!(id.kind_name(), "id");
        assert_eq!(id.text(), "input");
    }
}
