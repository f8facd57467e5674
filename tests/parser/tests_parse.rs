//! Trees built for valid input

use polytope::{Parse, parse};
use rstest::rstest;

use crate::helpers::languages::{arith, blocks, polytope, statements};

#[rstest]
#[case("1", "(expr (number))")]
#[case("1 + 2", "(expr (expr (number)) (expr (number)))")]
#[case("1+2+3", "(expr (expr (expr (number)) (expr (number))) (expr (number)))")]
#[case(" 12 \n", "(expr (number))")]
fn test_arith(#[case] input: &str, #[case] expected: &str) {
    let parse = parse(input, &arith());
    assert!(parse.ok(), "{:?}", parse.errors());
    assert_eq!(parse.to_sexp(), expected);
    assert_eq!(parse.text(), input);
}

#[rstest]
#[case("", "(file)")]
#[case("{ }", "(file (block))")]
#[case("{ a; { b; } }", "(file (block (item (id)) (item (block (item (id))))))")]
#[case("{a;}{b;}", "(file (block (item (id))) (block (item (id))))")]
fn test_blocks(#[case] input: &str, #[case] expected: &str) {
    let parse = parse(input, &blocks());
    assert!(parse.ok(), "{:?}", parse.errors());
    assert_eq!(parse.to_sexp(), expected);
}

#[test]
fn test_root_covers_whole_input() {
    let input = "\n  { a; }\n\n{ b; }  \n";
    let parse = parse(input, &blocks());
    assert!(parse.ok());
    let root = parse.root();
    assert_eq!(usize::from(root.start()), 0);
    assert_eq!(usize::from(root.end()), input.len());

    // Nodes span their first to last token; trivia stays outside.
    let first = root.named_child(0).unwrap();
    assert_eq!(first.text(), "{ a; }");
    assert_eq!(usize::from(first.start()), 3);
}

#[test]
fn test_statements_accept_empty_list() {
    let parse: Parse = parse("  ", &statements());
    assert!(parse.ok());
    assert_eq!(parse.to_sexp(), "(list)");
    assert_eq!(parse.root().child_count(), 1);
    assert!(parse.root().child(0).unwrap().is_extra());
}

#[test]
fn test_polytope_minimal_program() {
    let source = "input { } satisfies { } output { } solution { }";
    let parse = parse(source, &polytope());
    assert!(parse.ok(), "{:?}", parse.errors());
    assert_eq!(
        parse.to_sexp(),
        "(source_file input: (input) output: (output) solution: (solution))"
    );
}

#[test]
fn test_polytope_fields() {
    let source = "input { n: int; } satisfies { } output { } solution { x = f(n, 1); }";
    let parse = parse(source, &polytope());
    assert!(parse.ok(), "{:?}", parse.errors());
    assert_eq!(
        parse.to_sexp(),
        "(source_file \
         input: (input body: (input_line targets: (io_target id: (id)))) \
         output: (output) \
         solution: (solution body: (assign_stmt (id) (call_expr callee: (id) argument: (refer_expr (id)) argument: (int_literal)))))"
    );
}
