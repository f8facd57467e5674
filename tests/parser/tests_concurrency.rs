//! Sharing compiled grammars across threads

use polytope::language::GrammarCache;
use polytope::{Language, parse};
use rayon::prelude::*;

use crate::helpers::fixtures::polytope_fixtures;
use crate::helpers::languages::{BLOCKS, polytope};

#[test]
fn test_parallel_parses_match_sequential() {
    let language = polytope();
    let fixtures = polytope_fixtures();

    let sequential: Vec<String> = fixtures
        .iter()
        .map(|fixture| parse(&fixture.source, &language).to_sexp())
        .collect();
    let parallel: Vec<String> = fixtures
        .par_iter()
        .map(|fixture| parse(&fixture.source, &language).to_sexp())
        .collect();

    assert_eq!(parallel, sequential);
}

#[test]
fn test_parses_move_between_threads() {
    let language = polytope();
    let parses: Vec<_> = polytope_fixtures()
        .into_par_iter()
        .map(|fixture| (fixture.name(), parse(&fixture.source, &language)))
        .collect();
    for (name, parse) in parses {
        assert!(parse.language().ptr_eq(&language), "{name}");
        assert_eq!(parse.text().is_empty(), parse.root().child_count() == 0, "{name}");
    }
}

#[test]
fn test_cache_hands_out_one_language() {
    let cache = GrammarCache::new();
    let languages: Vec<Language> = (0..32)
        .into_par_iter()
        .map(|_| cache.get_or_compile("blocks", BLOCKS).unwrap())
        .collect();

    assert_eq!(cache.len(), 1);
    let cached = cache.get("blocks").unwrap();
    assert!(languages.iter().all(|language| language.ptr_eq(&cached)));
}

#[test]
fn test_global_cache_is_shared() {
    let first = GrammarCache::global()
        .get_or_compile("concurrency-blocks", BLOCKS)
        .unwrap();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            std::thread::spawn(|| {
                GrammarCache::global()
                    .get_or_compile("concurrency-blocks", BLOCKS)
                    .unwrap()
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap().ptr_eq(&first));
    }
}
