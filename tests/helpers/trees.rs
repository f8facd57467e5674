//! Tree comparison helpers.

use polytope::{Parse, SyntaxKind, TextRange};

/// Every element of the tree as `(kind, range)` in pre-order.
pub fn shape(parse: &Parse) -> Vec<(SyntaxKind, TextRange)> {
    parse
        .syntax()
        .descendants_with_tokens()
        .map(|element| (SyntaxKind::from(element.kind()), element.text_range()))
        .collect()
}

/// Assert two parses built the same tree over the same text.
pub fn assert_same_tree(actual: &Parse, expected: &Parse, context: &str) {
    assert_eq!(actual.text(), expected.text(), "{context}");
    assert_eq!(
        shape(actual),
        shape(expected),
        "{context}\nactual:   {}\nexpected: {}",
        actual.to_sexp(),
        expected.to_sexp()
    );
    let errors = |parse: &Parse| {
        parse
            .errors()
            .iter()
            .map(|e| (e.code, e.range))
            .collect::<Vec<_>>()
    };
    assert_eq!(errors(actual), errors(expected), "{context}");
}

/// Error codes in order, for compact assertions.
pub fn error_codes(parse: &Parse) -> Vec<&'static str> {
    parse.errors().iter().map(|e| e.code.as_str()).collect()
}
