//! Sharing unchanged subtrees across re-parses

use polytope::incremental::ReusePool;
use polytope::{Edit, IncrementalOptions, ParseOptions, TextRange, TextSize, parse, reparse, reparse_with};

use crate::helpers::fixtures::fixture;
use crate::helpers::languages::{arith, blocks, polytope};

fn replace(source: &str, from: &str, to: &str) -> (Edit, String) {
    let start = source.find(from).unwrap();
    let edit = Edit::replace(TextRange::at(TextSize::new(start as u32), TextSize::of(from)), to);
    let new = edit.apply(source).unwrap();
    (edit, new)
}

#[test]
fn test_untouched_sections_are_shared() {
    let language = polytope();
    let source = fixture("sum.poly").source;
    let prior = parse(&source, &language);
    let (edit, new) = replace(&source, "total + a", "total + 2 * a");
    let next = reparse(&prior, &edit, &new, &language);

    assert!(next.ok(), "{:?}", next.errors());
    for field in ["input", "output"] {
        let old = prior.root().child_by_field_name(field).unwrap();
        let new = next.root().child_by_field_name(field).unwrap();
        assert!(new.same_subtree(&old), "{field} was rebuilt");
    }
    let old_solution = prior.root().child_by_field_name("solution").unwrap();
    let new_solution = next.root().child_by_field_name("solution").unwrap();
    assert!(!new_solution.same_subtree(&old_solution));
}

#[test]
fn test_window_builds_little() {
    let language = polytope();
    let source = fixture("sum.poly").source;
    let prior = parse(&source, &language);
    let (edit, new) = replace(&source, "answer", "result");
    let next = reparse(&prior, &edit, &new, &language);

    let reparsed = next.stats().reparsed.unwrap();
    assert!(reparsed.len() < TextSize::of(new.as_str()));
    assert!(next.stats().built_tokens < prior.stats().built_tokens);
    assert!(next.stats().built_nodes < prior.stats().built_nodes);
    assert!(!next.stats().full_reparse);
    assert!(next.stats().attempts >= 1);
}

#[test]
fn test_full_reparse_reuses_unaffected_tokens() {
    let language = blocks();
    let old = "{ a; } { b; } { c; }";
    let prior = parse(old, &language);
    let options = IncrementalOptions {
        max_attempts: 0,
        ..Default::default()
    };
    let edit = Edit::replace(TextRange::at(TextSize::new(9), TextSize::new(1)), "x");
    let new = edit.apply(old).unwrap();
    let next = reparse_with(&prior, &edit, &new, &language, &options);

    assert!(next.stats().full_reparse);
    assert!(next.stats().reused_tokens > 0);
    assert!(next.stats().reused_nodes > 0);
    let first_old = prior.root().named_child(0).unwrap();
    let first_new = next.root().named_child(0).unwrap();
    assert!(first_new.same_subtree(&first_old));
}

#[test]
fn test_token_limit_forces_full_reparse() {
    let language = arith();
    let prior = parse("1 + 2 + 3", &language);
    let options = IncrementalOptions {
        parse: ParseOptions {
            max_tokens: Some(100),
            ..Default::default()
        },
        ..Default::default()
    };
    let edit = Edit::replace(TextRange::at(TextSize::new(4), TextSize::new(1)), "5");
    let next = reparse_with(&prior, &edit, "1 + 5 + 3", &language, &options);
    assert!(next.stats().full_reparse);
    assert_eq!(next.stats().attempts, 0);
    assert!(next.ok());
}

#[test]
fn test_noop_edit_returns_prior_tree() {
    let language = polytope();
    let source = fixture("greeting.poly").source;
    let prior = parse(&source, &language);
    let edit = Edit::insert(TextSize::new(3), "");
    let next = reparse(&prior, &edit, &source, &language);
    assert!(next.root().same_subtree(&prior.root()));
    assert_eq!(next.errors(), prior.errors());
}

#[test]
fn test_other_language_parses_from_scratch() {
    let prior = parse("1 + 2", &arith());
    let edit = Edit::insert(TextSize::new(5), " + 3");
    let language = arith();
    let next = reparse(&prior, &edit, "1 + 2 + 3", &language);
    assert!(next.stats().full_reparse);
    assert!(next.language().ptr_eq(&language));
    assert!(next.ok());
}

#[test]
fn test_pool_skips_edited_elements() {
    let prior = parse("{ a; } { b; }", &blocks());
    let untouched = ReusePool::new(&prior.syntax(), &Edit::insert(TextSize::new(13), " "));
    let delete_b = Edit::delete(TextRange::at(TextSize::new(9), TextSize::new(1)));
    let edited = ReusePool::new(&prior.syntax(), &delete_b);
    assert!(edited.token_count() < untouched.token_count());
    assert!(edited.node_count() < untouched.node_count());
}
