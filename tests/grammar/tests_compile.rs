//! Compiling grammar descriptions

use polytope::grammar::TokenPattern;
use polytope::{
    CompileError, CompileOptions, Grammar, Language, Rule, compile, compile_str, compile_with,
    parse,
};
use rstest::rstest;

use crate::helpers::languages::{ARITH, BLOCKS, STATEMENTS};

fn arith_by_hand() -> Grammar {
    Grammar::new("arith")
        .start("expr")
        .token("ws", TokenPattern::regex(r"\s+"))
        .token("number", TokenPattern::regex("[0-9]+"))
        .extra("ws")
        .rule(
            "expr",
            Rule::choice([
                Rule::prec_left(
                    1,
                    Rule::seq([Rule::sym("expr"), Rule::lit("+"), Rule::sym("expr")]),
                ),
                Rule::sym("number"),
            ]),
        )
}

#[test]
fn test_builder_matches_description() {
    let described: Grammar = ARITH.parse().unwrap();
    assert_eq!(described, arith_by_hand());

    let language = Language::new(compile(&arith_by_hand()).unwrap());
    let parse = parse("1 + 2", &language);
    assert!(parse.ok());
    assert_eq!(parse.to_sexp(), "(expr (expr (number)) (expr (number)))");
}

#[rstest]
#[case::arith(ARITH)]
#[case::blocks(BLOCKS)]
#[case::statements(STATEMENTS)]
#[case::polytope(polytope::polytope::GRAMMAR)]
fn test_grammars_compile(#[case] source: &str) {
    let automaton = compile_str(source).unwrap_or_else(|err| panic!("{err}"));
    assert!(automaton.state_count() > 1);
    assert!(automaton.terminal_count() < automaton.symbol_count());
    let rendered = automaton.to_string();
    assert!(rendered.starts_with(&format!("grammar {}:", automaton.name())));
}

#[rstest]
#[case::undefined_symbol("a = b;", "undefined symbol `b` referenced in rule `a`")]
#[case::undefined_start(r#"start b; a = "x";"#, "start rule `b` is not defined")]
#[case::duplicate(r#"a = "x"; a = "y";"#, "`a` is defined more than once")]
#[case::reserved(r#"error = "x";"#, "`error` is a reserved name")]
#[case::empty_token("token t = /a*/; a = t;", "token `t` matches the empty string")]
#[case::referenced_extra(r#"extras ws; token ws = /\s+/; a = ws;"#, "extra `ws`")]
#[case::bad_pattern("token t = /[/; a = t;", "invalid pattern for token `t`")]
#[case::no_rules("", "grammar defines no rules")]
#[case::syntax(r#"a = "x""#, "grammar syntax error at 1:")]
#[case::ambiguous("token n = /[0-9]+/; e = e \"-\" e | n;", "unresolved conflict")]
fn test_rejected_grammars(#[case] source: &str, #[case] message: &str) {
    let err = compile_str(source).unwrap_err();
    let rendered = err.to_string();
    assert!(rendered.contains(message), "{rendered:?} should mention {message:?}");
}

#[test]
fn test_conflicts_name_the_state_and_lookahead() {
    let err = compile_str(r#"token n = /[0-9]+/; e = e "-" e | n;"#).unwrap_err();
    let CompileError::Conflicts(conflicts) = &err else {
        panic!("expected conflicts, got {err}");
    };
    let conflict = &conflicts[0];
    assert_eq!(conflict.lookahead, "\"-\"");
    assert_eq!(conflict.reduce, r#"e -> e "-" e"#);
    assert!(conflict.to_string().starts_with(&format!("state {}", conflict.state)));
}

#[rstest]
#[case::arith(ARITH, &["1 + 2 + 3", "1 + + 2"])]
#[case::blocks(BLOCKS, &["{ a; { b; } }", "{ } { }"])]
#[case::polytope(polytope::polytope::GRAMMAR, &["input { n: int; } satisfies { } output { } solution { print(n); }"])]
fn test_canonical_tables_parse_alike(#[case] source: &str, #[case] inputs: &[&str]) {
    let grammar: Grammar = source.parse().unwrap();
    let lalr = Language::new(compile(&grammar).unwrap());
    let canonical =
        Language::new(compile_with(&grammar, &CompileOptions { canonical_lr: true }).unwrap());
    assert!(canonical.automaton().state_count() >= lalr.automaton().state_count());

    for input in inputs {
        let a = parse(input, &lalr);
        let b = parse(input, &canonical);
        assert_eq!(a.to_sexp(), b.to_sexp(), "{input:?}");
        assert_eq!(a.ok(), b.ok(), "{input:?}");
    }
}
