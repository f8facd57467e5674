//! Source fixtures under `tests/fixtures`.

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub struct Fixture {
    pub path: PathBuf,
    pub source: String,
}

impl Fixture {
    pub fn name(&self) -> String {
        self.path
            .strip_prefix(fixture_dir())
            .unwrap_or(&self.path)
            .display()
            .to_string()
    }

    /// Fixtures under an `errors` directory are expected to need recovery.
    pub fn expects_errors(&self) -> bool {
        self.path.components().any(|c| c.as_os_str() == "errors")
    }
}

pub fn fixture_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

/// Every `.poly` file, sorted by path.
pub fn polytope_fixtures() -> Vec<Fixture> {
    let fixtures: Vec<_> = WalkDir::new(fixture_dir().join("polytope"))
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "poly"))
        .map(|entry| Fixture {
            source: fs::read_to_string(entry.path()).unwrap(),
            path: entry.into_path(),
        })
        .collect();
    assert!(!fixtures.is_empty(), "no fixtures under {}", fixture_dir().display());
    fixtures
}

pub fn fixture(name: &str) -> Fixture {
    polytope_fixtures()
        .into_iter()
        .find(|fixture| fixture.name().ends_with(name))
        .unwrap_or_else(|| panic!("no fixture named {name}"))
}
