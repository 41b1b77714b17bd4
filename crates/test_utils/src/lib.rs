//! Fixture and markdown test helpers shared by the workspace's test suites.
//!
//! Fixtures live under `test_data/` at the workspace root as `.c` and `.cpp`
//! files; markdown tests live under `mdtest/`.

pub mod mdtest;

use once_cell::sync::Lazy;
use std::path::{Path, PathBuf};

pub(crate) static WORKSPACE_ROOT: Lazy<PathBuf> = Lazy::new(|| {
    let mut current = PathBuf::from(env!("CARGO_MANIFEST_DIR"));

    loop {
        if current.join("Cargo.toml").exists() {
            let cargo_toml = std::fs::read_to_string(current.join("Cargo.toml"))
                .expect("Failed to read Cargo.toml");
            if cargo_toml.contains("[workspace]") {
                return current;
            }
        }

        current = current
            .parent()
            .expect("Could not find workspace root")
            .to_path_buf();
    }
});

/// Extensions of source fixtures
pub const SOURCE_EXTENSIONS: [&str; 2] = ["c", "cpp"];

pub fn test_data_path() -> PathBuf {
    WORKSPACE_ROOT.join("test_data")
}

pub fn mdtest_path() -> PathBuf {
    WORKSPACE_ROOT.join("mdtest")
}

/// Absolute path of a fixture, e.g. `fixture_path("index/util.c")`
pub fn fixture_path(name: &str) -> PathBuf {
    test_data_path().join(name)
}

/// Contents of a fixture; panics when it is missing
pub fn read_fixture(name: &str) -> String {
    let path = fixture_path(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture '{}': {}", path.display(), e))
}

pub fn fixture_exists(name: &str) -> bool {
    fixture_path(name).exists()
}

fn is_source(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

/// Source fixture file names in one subdirectory of `test_data/`, sorted
pub fn list_fixtures(subdir: &str) -> Vec<String> {
    let dir_path = test_data_path().join(subdir);

    let mut names: Vec<String> = std::fs::read_dir(&dir_path)
        .unwrap_or_else(|e| panic!("Failed to read directory '{}': {}", dir_path.display(), e))
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            if is_source(&path) {
                path.file_name()?.to_str().map(String::from)
            } else {
                None
            }
        })
        .collect();
    names.sort();
    names
}

/// Every source fixture as `(relative path, file stem)`, sorted
pub fn discover_all_fixtures() -> Vec<(String, String)> {
    let test_data = test_data_path();
    let mut fixtures = Vec::new();
    discover_fixtures_recursive(&test_data, &test_data, &mut fixtures);
    fixtures.sort();
    fixtures
}

fn discover_fixtures_recursive(base_path: &Path, current_path: &Path, fixtures: &mut Vec<(String, String)>) {
    let Ok(entries) = std::fs::read_dir(current_path) else {
        tracing::trace!(path = %current_path.display(), "fixture directory not readable");
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            discover_fixtures_recursive(base_path, &path, fixtures);
        } else if is_source(&path) {
            if let Ok(relative_path) = path.strip_prefix(base_path) {
                let relative_str = relative_path.to_string_lossy().replace('\\', "/");
                let file_stem = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("unknown")
                    .to_string();
                fixtures.push((relative_str, file_stem));
            }
        }
    }
}

/// Fixtures grouped by their first directory; top-level files go to `root`
pub fn discover_fixtures_by_category() -> std::collections::BTreeMap<String, Vec<String>> {
    let mut categories = std::collections::BTreeMap::new();

    for (path, _stem) in discover_all_fixtures() {
        let category = match path.split_once('/') {
            Some((dir, _)) => dir.to_string(),
            None => "root".to_string(),
        };
        categories
            .entry(category)
            .or_insert_with(Vec::new)
            .push(path);
    }

    categories
}
