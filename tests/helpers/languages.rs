//! Small grammars used across the integration tests.

use polytope::Language;

/// Left-associative sums.
pub const ARITH: &str = r#"
    grammar arith;
    start expr;
    extras ws;
    token ws = /\s+/;
    token number = /[0-9]+/;
    expr = @left(1) expr "+" expr | number;
"#;

/// Nested blocks of `id;` items.
pub const BLOCKS: &str = r#"
    grammar blocks;
    start file;
    extras ws;
    token ws = /\s+/;
    token id = /[a-z]+/;
    file = block*;
    block = "{" item* "}";
    item = id ";" | block;
"#;

/// Statements with an `error` catch-all.
pub const STATEMENTS: &str = r#"
    grammar statements;
    start list;
    extras ws;
    token ws = /\s+/;
    token n = /[0-9]+/;
    list = item*;
    item = n ";" | error ";";
"#;

pub fn arith() -> Language {
    Language::from_source(ARITH).unwrap()
}

pub fn blocks() -> Language {
    Language::from_source(BLOCKS).unwrap()
}

pub fn statements() -> Language {
    Language::from_source(STATEMENTS).unwrap()
}

pub fn polytope() -> Language {
    polytope::polytope::language().unwrap()
}
