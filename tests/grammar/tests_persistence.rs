//! Saving and loading compiled automata

use polytope::automaton::FORMAT_VERSION;
use polytope::{Automaton, Language, LoadError, compile_str, parse};
use tempfile::TempDir;

use crate::helpers::fixtures::polytope_fixtures;
use crate::helpers::languages::{ARITH, polytope};

#[test]
fn test_saved_automaton_parses_alike() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("polytope.json");

    let original = polytope();
    original.automaton().save(&path).unwrap();
    let loaded = Language::new(Automaton::load(&path).unwrap());

    assert_eq!(loaded.name(), original.name());
    assert_eq!(loaded.automaton().state_count(), original.automaton().state_count());
    assert!(!loaded.ptr_eq(&original));

    for fixture in polytope_fixtures() {
        let expected = parse(&fixture.source, &original);
        let actual = parse(&fixture.source, &loaded);
        assert_eq!(actual.to_sexp(), expected.to_sexp(), "{}", fixture.name());
        assert_eq!(actual.errors(), expected.errors(), "{}", fixture.name());
    }
}

#[test]
fn test_json_is_stable() {
    let automaton = compile_str(ARITH).unwrap();
    let json = automaton.to_json().unwrap();
    let reloaded = Automaton::from_json(&json).unwrap();
    assert_eq!(reloaded.to_json().unwrap(), json);
    assert_eq!(reloaded.to_string(), automaton.to_string());
}

#[test]
fn test_load_rejects_other_versions() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("arith.json");
    let json = compile_str(ARITH).unwrap().to_json().unwrap();
    let bumped = json.replacen(
        &format!("\"version\":{FORMAT_VERSION}"),
        &format!("\"version\":{}", FORMAT_VERSION + 1),
        1,
    );
    std::fs::write(&path, bumped).unwrap();

    let err = Automaton::load(&path).unwrap_err();
    assert!(
        matches!(err, LoadError::Version { found, expected } if found == FORMAT_VERSION + 1 && expected == FORMAT_VERSION),
        "{err}"
    );
}

#[test]
fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = Automaton::load(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, LoadError::Io(_)));
}
