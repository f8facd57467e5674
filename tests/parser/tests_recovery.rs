//! Error recovery over malformed input

use polytope::{ErrorCode, Language, ParseOptions, RecoveryOptions, parse, parse_with};
use rstest::rstest;

use crate::helpers::languages::{arith, blocks, polytope, statements};
use crate::helpers::trees::error_codes;

#[rstest]
#[case::extra_operator("1 + + 2", &["E0201"])]
#[case::missing_operand("1 +", &["E0202"])]
#[case::empty("", &["E0202"])]
#[case::stray_character("1 + 2 $", &["E0101"])]
fn test_arith_errors(#[case] input: &str, #[case] expected: &[&str]) {
    let parse = parse(input, &arith());
    assert_eq!(error_codes(&parse), expected, "{}", parse.to_sexp());
    assert_eq!(parse.text(), input);
}

#[rstest]
#[case::unclosed_block("{ a; ", &["E0202"], r#"missing "}""#)]
#[case::missing_semicolon("{ a }", &["E0202"], r#"missing ";""#)]
#[case::extra_brace("{ a; } }", &["E0201"], r#"unexpected "}""#)]
fn test_block_errors(#[case] input: &str, #[case] codes: &[&str], #[case] message: &str) {
    let parse = parse(input, &blocks());
    assert_eq!(error_codes(&parse), codes, "{}", parse.to_sexp());
    assert_eq!(parse.errors()[0].message, message);
    assert_eq!(parse.text(), input);
}

#[test]
fn test_missing_token_is_zero_width_at_gap() {
    let parse = parse("{ a }", &blocks());
    let error = &parse.errors()[0];
    assert!(error.range.is_empty());
    assert!((3..=4).contains(&usize::from(error.range.start())));
    assert!(parse.root().has_error());
    assert!(parse.to_sexp().contains(r#"(MISSING ";")"#), "{}", parse.to_sexp());
}

#[test]
fn test_error_rule_catches_bad_statement() {
    let parse = parse("1; x; 2;", &statements());
    assert_eq!(
        parse.to_sexp(),
        "(list (item (n)) (item (ERROR (ERROR))) (item (n)))"
    );
    assert_eq!(error_codes(&parse), ["E0101"]);
    assert_eq!(parse.stats().recoveries, 1);
}

#[test]
fn test_duplicate_token_is_deleted() {
    let parse = parse("1; 2 2; 3;", &statements());
    assert_eq!(error_codes(&parse), ["E0201"]);
    assert_eq!(parse.errors()[0].message, "unexpected n");
    assert_eq!(u32::from(parse.errors()[0].range.len()), 1);
}

#[test]
fn test_token_limit_leaves_rest_unparsed() {
    let options = ParseOptions {
        max_tokens: Some(4),
        ..Default::default()
    };
    let input = "{ a; b; c; }";
    let parse = parse_with(input, &blocks(), &options);
    assert_eq!(parse.text(), input);
    assert!(parse.errors().iter().any(|e| e.code == ErrorCode::E0102));
}

#[test]
fn test_narrow_recovery_still_terminates() {
    let options = ParseOptions {
        recovery: RecoveryOptions {
            max_skip: 1,
            max_pop_depth: 0,
            sync_tokens: 1,
        },
        ..Default::default()
    };
    for input in ["}}}}", "{ { { a", "; ; {", "{ a b c d e f }"] {
        let parse = parse_with(input, &blocks(), &options);
        assert_eq!(parse.text(), input);
        assert!(!parse.ok(), "{input:?}");
    }
}

fn assert_recovers(input: &str, language: &Language) {
    let parse = parse(input, language);
    assert_eq!(parse.text(), input, "{input:?}");
    assert_eq!(parse.ok(), parse.errors().is_empty());
    let len = input.len() as u32;
    for error in parse.errors() {
        assert!(u32::from(error.range.end()) <= len, "{input:?}: {error:?}");
    }
}

#[test]
fn test_truncated_programs_recover() {
    let program = "input { n: int; } satisfies { n > 0; } output { r: int; } \
                   solution { var r: int = 0; for (1 <= i <= n) { r = r + i; } print(r); }";
    let language = polytope();
    // Every prefix, cut at character boundaries
    for (cut, _) in program.char_indices() {
        assert_recovers(&program[..cut], &language);
    }
}

#[rstest]
#[case::arith("+ 1 + ) 2 3 4 +")]
#[case::unicode("1 + é + 2")]
#[case::only_garbage("@@@ ### $$$")]
#[case::deep_nesting("{ { { { { { { { { { a; } } } } } } } } }}}}")]
fn test_garbage_never_panics(#[case] input: &str) {
    assert_recovers(input, &arith());
    assert_recovers(input, &blocks());
    assert_recovers(input, &statements());
    assert_recovers(input, &polytope());
}
