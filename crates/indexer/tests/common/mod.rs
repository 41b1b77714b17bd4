//! Temporary project directories for indexer tests

use std::path::{Path, PathBuf};

use cdom_diagnostics::DiagnosticCode;
use cdom_indexer::{FileOutcome, SourceInput};
use tempfile::TempDir;

/// A temporary directory cleaned up on drop
#[derive(Debug)]
pub struct Fixture {
    temp_dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temporary directory");
        Self { temp_dir }
    }

    /// Writes `content` to `path` inside the fixture, creating parent directories
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl AsRef<str>) -> PathBuf {
        let full_path = self.temp_dir.path().join(path.as_ref());
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(&full_path, content.as_ref()).expect("Failed to write file");
        full_path
    }

    pub fn root_path(&self) -> &Path {
        self.temp_dir.path()
    }
}

/// An input read from `test_data/`, keyed by its fixture name
pub fn fixture_input(name: &str) -> SourceInput {
    SourceInput::new(name, cdom_test_utils::read_fixture(name))
}

pub fn codes(outcome: &FileOutcome) -> Vec<DiagnosticCode> {
    outcome.diagnostics.iter().map(|d| d.code).collect()
}
