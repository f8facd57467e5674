//! Diagnostics derived from recovered trees

use super::*;
use crate::language::Language;
use crate::parser::{ParseOptions, parse, parse_with};
use crate::parser::{SyntaxKind, SyntaxNode};
use rowan::{GreenNode, GreenToken, NodeOrToken, TextRange, TextSize};

fn arith() -> Language {
    Language::from_source(
        r#"grammar arith; extras ws; token ws = /\s+/; token number = /[0-9]+/;
           expr = @left(1) expr "+" expr | number;"#,
    )
    .unwrap()
}

fn codes(errors: &[SyntaxError]) -> Vec<ErrorCode> {
    errors.iter().map(|e| e.code).collect()
}

#[test]
fn test_valid_input_has_no_errors() {
    let parse = parse("1 + 2", &arith());
    assert!(parse.ok());
    assert!(parse.errors().is_empty());
}

#[test]
fn test_missing_operand() {
    let parse = parse("1+", &arith());
    assert_eq!(codes(parse.errors()), [ErrorCode::E0202]);
    let err = &parse.errors()[0];
    assert_eq!(err.range, TextRange::empty(TextSize::new(2)));
    assert_eq!(err.message, "missing number");
    assert_eq!(err.hint.as_deref(), Some("insert number"));
    assert_eq!(err.related[0].range, TextRange::new(TextSize::new(1), TextSize::new(2)));
}

#[test]
fn test_unexpected_token() {
    let parse = parse("1 + + 2", &arith());
    assert_eq!(codes(parse.errors()), [ErrorCode::E0201]);
    let err = &parse.errors()[0];
    assert_eq!(err.message, "unexpected \"+\"");
    assert_eq!(err.range, TextRange::new(TextSize::new(4), TextSize::new(5)));
}

#[test]
fn test_unrecognized_character() {
    let parse = parse("1 + $2", &arith());
    let errors = parse.errors();
    assert_eq!(codes(errors), [ErrorCode::E0101]);
    assert_eq!(errors[0].message, "unrecognized character \"$\"");
    assert_eq!(errors[0].range, TextRange::new(TextSize::new(4), TextSize::new(5)));
}

#[test]
fn test_token_limit_reports_unparsed_input() {
    let options = ParseOptions {
        max_tokens: Some(3),
        ..Default::default()
    };
    let parse = parse_with("1 + 2 + 3", &arith(), &options);
    assert_eq!(parse.text(), "1 + 2 + 3");
    assert!(codes(parse.errors()).contains(&ErrorCode::E0102));
}

#[test]
fn test_error_token_code_follows_cut_off() {
    let language = arith();
    let rest = GreenToken::new(SyntaxKind::ERROR.into(), "2 + 3");
    let number = GreenToken::new(language.automaton().kind_by_name("number").unwrap().into(), "1");
    let green = GreenNode::new(
        SyntaxKind::ERROR.into(),
        [NodeOrToken::Token(number), NodeOrToken::Token(rest)],
    );
    let root = SyntaxNode::new_root(green);

    // A leftover run that the parser gave up on is not a token-limit cut
    let errors = collect_errors(&root, language.automaton(), None);
    assert_eq!(codes(&errors), [ErrorCode::E0204, ErrorCode::E0101]);
    assert_eq!(errors[1].message, "unrecognized input \"2 + 3\"");

    let errors = collect_errors(&root, language.automaton(), Some(TextSize::new(1)));
    assert_eq!(codes(&errors), [ErrorCode::E0204, ErrorCode::E0102]);
    assert_eq!(errors[1].range, TextRange::new(TextSize::new(1), TextSize::new(6)));
}

#[test]
fn test_errors_sorted_by_position() {
    let parse = parse("1 + + 2 + $", &arith());
    let starts: Vec<_> = parse.errors().iter().map(|e| e.range.start()).collect();
    let mut sorted = starts.clone();
    sorted.sort();
    assert_eq!(starts, sorted);
    assert!(parse.errors().len() >= 2);
}

#[test]
fn test_related_info_creation() {
    let info = RelatedInfo::new(
        "expected after this",
        TextRange::new(TextSize::new(5), TextSize::new(6)),
    );

    assert_eq!(info.message, "expected after this");
    assert_eq!(info.range.start(), TextSize::new(5));
    assert_eq!(info.range.end(), TextSize::new(6));
}
