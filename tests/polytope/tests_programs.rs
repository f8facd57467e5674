//! Parsing the Polytope fixture programs

use polytope::polytope::parse;
use polytope::{ErrorCode, LineIndex};
use rstest::rstest;

use crate::helpers::fixtures::{fixture, polytope_fixtures};
use crate::helpers::trees::error_codes;

#[test]
fn test_fixtures_parse_as_expected() {
    for fixture in polytope_fixtures() {
        let parse = parse(&fixture.source).unwrap();
        assert_eq!(parse.text(), fixture.source, "{}", fixture.name());
        assert_eq!(parse.root().kind_name(), "source_file", "{}", fixture.name());
        if fixture.expects_errors() {
            assert!(!parse.ok(), "{} parsed cleanly", fixture.name());
            assert!(parse.root().has_error(), "{}", fixture.name());
        } else {
            assert!(parse.ok(), "{}: {:?}", fixture.name(), parse.errors());
            assert!(!parse.root().has_error(), "{}", fixture.name());
        }
    }
}

#[rstest]
#[case::missing_semicolon("missing_semicolon.poly", &["E0202", "E0202"])]
#[case::stray_operator("stray_operator.poly", &["E0201"])]
#[case::unterminated("unterminated.poly", &["E0202", "E0202", "E0202", "E0202"])]
fn test_error_fixtures(#[case] name: &str, #[case] codes: &[&str]) {
    let fixture = fixture(name);
    let parse = parse(&fixture.source).unwrap();
    assert_eq!(error_codes(&parse), codes, "{}", parse.to_sexp());
}

#[test]
fn test_missing_semicolons_are_located() {
    let fixture = fixture("missing_semicolon.poly");
    let parse = parse(&fixture.source).unwrap();
    let index = LineIndex::new(&fixture.source);

    let lines: Vec<_> = parse
        .errors()
        .iter()
        .map(|error| {
            assert_eq!(error.message, r#"missing ";""#);
            error.span(&index).start.line
        })
        .collect();
    assert_eq!(lines, [0, 2]);
}

#[test]
fn test_unterminated_errors_sit_at_end() {
    let fixture = fixture("unterminated.poly");
    let parse = parse(&fixture.source).unwrap();
    let end = fixture.source.trim_end().len() as u32;
    for error in parse.errors() {
        assert_eq!(error.code, ErrorCode::E0202);
        assert!(error.range.is_empty());
        assert!(u32::from(error.range.start()) >= end, "{error:?}");
    }
}

#[test]
fn test_stray_operator_is_isolated() {
    let fixture = fixture("stray_operator.poly");
    let parse = parse(&fixture.source).unwrap();
    let error = &parse.errors()[0];
    assert_eq!(&fixture.source[error.range], "*");

    // The rest of the program keeps its shape
    let sexp = parse.to_sexp();
    assert!(sexp.contains("(print_stmt expr: (binary_op"), "{sexp}");
    assert!(sexp.contains("output: (output body: (output_line"), "{sexp}");
}
