//! The shared cross-file index.
//!
//! Readers take an [`Arc<IndexSnapshot>`] and keep using it for as long as
//! they like; publishing builds a whole new snapshot and swaps it in, so a
//! reader never observes a half-applied update.

use std::sync::{Arc, RwLock};

use cdom_parser::ParsedUnit;
use cdom_semantic::{BindingKey, CrossFileIndex, IndexedName, SemanticModel};
use indexmap::IndexMap;

/// File-level names one translation unit contributes to the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileIndex {
    pub file_path: String,
    pub names: Vec<IndexedName>,
}

impl FileIndex {
    pub fn from_model(unit: &ParsedUnit, model: &SemanticModel) -> Self {
        let names = model
            .file_level_bindings()
            .filter_map(|(_, binding)| {
                let first = *binding.declarations.first()?;
                IndexedName::from_binding(binding, &unit.file_path, unit.ast.node(first).span)
            })
            .collect();
        Self {
            file_path: unit.file_path.clone(),
            names,
        }
    }
}

/// An immutable view of every published file
#[derive(Debug, Default)]
pub struct IndexSnapshot {
    generation: u64,
    files: IndexMap<String, FileIndex>,
    definitions: IndexMap<BindingKey, Vec<IndexedName>>,
    declarations: IndexMap<BindingKey, Vec<IndexedName>>,
}

impl IndexSnapshot {
    fn build(generation: u64, files: IndexMap<String, FileIndex>) -> Self {
        let mut definitions: IndexMap<BindingKey, Vec<IndexedName>> = IndexMap::new();
        let mut declarations: IndexMap<BindingKey, Vec<IndexedName>> = IndexMap::new();
        for name in files.values().flat_map(|file| &file.names) {
            let bucket = if name.is_definition {
                &mut definitions
            } else {
                &mut declarations
            };
            bucket.entry(name.key()).or_default().push(name.clone());
        }
        Self {
            generation,
            files,
            definitions,
            declarations,
        }
    }

    /// Number of publications this snapshot reflects
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    pub fn file(&self, path: &str) -> Option<&FileIndex> {
        self.files.get(path)
    }

    /// Indexed files in first-publication order
    pub fn files(&self) -> impl Iterator<Item = &FileIndex> {
        self.files.values()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl CrossFileIndex for IndexSnapshot {
    fn find_definitions(&self, key: &BindingKey) -> Vec<IndexedName> {
        self.definitions.get(key).cloned().unwrap_or_default()
    }

    fn find_declarations(&self, key: &BindingKey) -> Vec<IndexedName> {
        self.declarations.get(key).cloned().unwrap_or_default()
    }
}

/// The index shared between indexing runs and readers
#[derive(Debug, Default)]
pub struct SharedIndex {
    current: RwLock<Arc<IndexSnapshot>>,
}

impl SharedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// The latest published snapshot
    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Replaces the entries of every file in `files`, in order, as one update
    pub fn publish(&self, files: impl IntoIterator<Item = FileIndex>) -> Arc<IndexSnapshot> {
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut merged = guard.files.clone();
        let mut published = 0usize;
        for file in files {
            merged.insert(file.file_path.clone(), file);
            published += 1;
        }
        let next = Arc::new(IndexSnapshot::build(guard.generation + 1, merged));
        tracing::debug!(
            generation = next.generation,
            files = published,
            total = next.len(),
            "published index snapshot"
        );
        *guard = Arc::clone(&next);
        next
    }
}
