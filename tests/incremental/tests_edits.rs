//! Incremental re-parses build the same tree as parsing from scratch

use polytope::{Edit, Language, Parse, TextRange, TextSize, parse, reparse};
use rstest::rstest;

use crate::helpers::fixtures::{fixture, polytope_fixtures};
use crate::helpers::languages::{arith, blocks, polytope};
use crate::helpers::trees::assert_same_tree;

fn check(language: &Language, prior: &Parse, edit: &Edit) -> Parse {
    let old = prior.text();
    let new = edit.apply(&old).unwrap();
    let incremental = reparse(prior, edit, &new, language);
    let full = parse(&new, language);
    assert_same_tree(&incremental, &full, &format!("{edit:?} on {old:?}"));
    incremental
}

fn single_char_edits(text: &str) -> Vec<Edit> {
    let mut edits = Vec::new();
    for (offset, ch) in text.char_indices() {
        let at = TextSize::new(offset as u32);
        edits.push(Edit::insert(at, "x"));
        edits.push(Edit::insert(at, ";"));
        edits.push(Edit::insert(at, "}"));
        edits.push(Edit::delete(TextRange::at(at, TextSize::of(ch))));
    }
    edits.push(Edit::insert(TextSize::of(text), "\n"));
    edits
}

#[test]
fn test_single_char_edits_on_fixtures() {
    let language = polytope();
    for fixture in polytope_fixtures() {
        let prior = parse(&fixture.source, &language);
        for edit in single_char_edits(&fixture.source) {
            check(&language, &prior, &edit);
        }
    }
}

#[rstest]
#[case::rename_variable("total", "sum")]
#[case::change_type(": int", ": string")]
#[case::drop_statement("print(total);", "")]
#[case::add_statement("print(total);", "print(total); print(n);")]
#[case::break_loop("for (1 <= i <= n)", "for (1 <= i")]
#[case::add_restriction("n > 0;", "n > 0;; n < 100;")]
fn test_word_edits(#[case] from: &str, #[case] to: &str) {
    let language = polytope();
    let source = fixture("sum.poly").source;
    let prior = parse(&source, &language);
    let start = source.find(from).unwrap();
    let edit = Edit::replace(
        TextRange::at(TextSize::new(start as u32), TextSize::of(from)),
        to,
    );
    check(&language, &prior, &edit);
}

#[test]
fn test_typing_a_program() {
    let language = polytope();
    let target = fixture("operators.poly").source;

    let mut current = parse("", &language);
    for (offset, ch) in target.char_indices() {
        let edit = Edit::insert(TextSize::new(offset as u32), ch.to_string());
        current = check(&language, &current, &edit);
    }
    assert_eq!(current.text(), target);
    assert!(current.ok(), "{:?}", current.errors());
}

#[test]
fn test_deleting_a_program_backwards() {
    let language = blocks();
    let mut current = parse("{ a; { b; c; } }\n{ d; }", &language);
    while !current.text().is_empty() {
        let len = TextSize::of(current.text().as_str());
        let edit = Edit::delete(TextRange::new(len - TextSize::new(1), len));
        current = check(&language, &current, &edit);
    }
    assert_eq!(current.to_sexp(), "(file)");
}

#[rstest]
#[case::prepend("1 + 2", 0, 0, "3 + ")]
#[case::append("1 + 2", 5, 0, " + 3")]
#[case::join_numbers("1 + 2", 1, 3, "")]
#[case::split_number("12", 1, 0, " + ")]
#[case::replace_all("1 + 2", 0, 5, "7")]
fn test_arith_edits(#[case] old: &str, #[case] start: u32, #[case] removed: u32, #[case] inserted: &str) {
    let language = arith();
    let prior = parse(old, &language);
    let edit = Edit::new(TextSize::new(start), TextSize::new(removed), inserted);
    check(&language, &prior, &edit);
}

#[test]
fn test_edits_between_documents() {
    let language = blocks();
    let old = "{ a; } { b; } { c; }";
    let new = "{ a; } { bee; d; } { c; }";
    let prior = parse(old, &language);
    let edit = Edit::between(old, new);
    assert_eq!(edit.apply(old).unwrap(), new);
    check(&language, &prior, &edit);
}
