//! Parallel parse-and-bind over many translation units.

use std::sync::Arc;

use cdom_diagnostics::{Diagnostic, DiagnosticSeverity};
use cdom_parser::{parse_translation_unit, CancellationToken, Language, ParseError, ParsedUnit};
use cdom_semantic::{bind_unit, report_problems, CrossFileIndex, SemanticModel};
use rayon::prelude::*;

use crate::config::IndexerConfig;
use crate::index::{FileIndex, IndexSnapshot, SharedIndex};

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("indexing was cancelled")]
    Cancelled,
    #[error("failed to start worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// One file to index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInput {
    pub path: String,
    pub text: String,
    /// Overrides the configured dialect for this file
    pub language: Option<Language>,
}

impl SourceInput {
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
            language: None,
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }
}

/// A parsed and bound file
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub path: String,
    pub unit: Arc<ParsedUnit>,
    pub model: Arc<SemanticModel>,
    /// Preprocessor and syntax diagnostics followed by binding problems
    pub diagnostics: Vec<Diagnostic>,
}

impl FileOutcome {
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diagnostic| diagnostic.severity == DiagnosticSeverity::Error)
    }
}

/// A file whose parse aborted on an internal error
#[derive(Debug, Clone)]
pub struct FileFailure {
    pub path: String,
    pub error: ParseError,
}

#[derive(Debug)]
pub struct IndexRun {
    /// Successful files, in input order
    pub outcomes: Vec<FileOutcome>,
    pub failures: Vec<FileFailure>,
    /// The snapshot the run was bound against
    pub snapshot: Arc<IndexSnapshot>,
}

pub struct Indexer {
    config: IndexerConfig,
    index: Arc<SharedIndex>,
    cancellation: CancellationToken,
    pool: rayon::ThreadPool,
}

impl Indexer {
    pub fn new(config: IndexerConfig) -> Result<Self, IndexError> {
        Self::with_index(config, Arc::new(SharedIndex::new()))
    }

    /// An indexer publishing into an existing shared index
    pub fn with_index(config: IndexerConfig, index: Arc<SharedIndex>) -> Result<Self, IndexError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.jobs)
            .thread_name(|i| format!("cdom-index-{i}"))
            .build()?;
        Ok(Self {
            config,
            index,
            cancellation: CancellationToken::new(),
            pool,
        })
    }

    pub const fn config(&self) -> &IndexerConfig {
        &self.config
    }

    pub fn index(&self) -> &Arc<SharedIndex> {
        &self.index
    }

    /// Token that cancels the parses of the current run. The run that
    /// observes the cancellation clears it, so later runs proceed.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Parses and binds `inputs` against the current snapshot, then publishes
    /// their file-level names in input order. A cancelled run publishes nothing.
    pub fn index_files(&self, inputs: &[SourceInput]) -> Result<IndexRun, IndexError> {
        let run = self.process(inputs)?;
        let published = run
            .outcomes
            .iter()
            .map(|outcome| FileIndex::from_model(&outcome.unit, &outcome.model));
        self.index.publish(published);
        Ok(run)
    }

    /// Parses and binds `inputs` against the current snapshot without
    /// publishing anything
    pub fn check_files(&self, inputs: &[SourceInput]) -> Result<IndexRun, IndexError> {
        self.process(inputs)
    }

    fn process(&self, inputs: &[SourceInput]) -> Result<IndexRun, IndexError> {
        let snapshot = self.index.snapshot();
        let _span = tracing::debug_span!("index", files = inputs.len(), generation = snapshot.generation()).entered();

        let results: Vec<Result<FileOutcome, FileFailure>> = self.pool.install(|| {
            inputs
                .par_iter()
                .map(|input| self.process_file(input, snapshot.as_ref()))
                .collect()
        });

        if self.cancellation.is_cancelled()
            || results
                .iter()
                .any(|result| matches!(result, Err(FileFailure { error: ParseError::Cancelled, .. })))
        {
            tracing::debug!("indexing cancelled, nothing published");
            self.cancellation.reset();
            return Err(IndexError::Cancelled);
        }

        let mut outcomes = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(outcome) => outcomes.push(outcome),
                Err(failure) => {
                    tracing::warn!(file = failure.path.as_str(), "parse aborted: {}", failure.error);
                    failures.push(failure);
                }
            }
        }
        Ok(IndexRun {
            outcomes,
            failures,
            snapshot,
        })
    }

    fn process_file(&self, input: &SourceInput, index: &dyn CrossFileIndex) -> Result<FileOutcome, FileFailure> {
        let mut options = self.config.parser_options(&input.path);
        if let Some(language) = input.language {
            options.language = language;
        }
        let failure = |error| FileFailure {
            path: input.path.clone(),
            error,
        };
        if self.cancellation.is_cancelled() {
            return Err(failure(ParseError::Cancelled));
        }

        let unit = parse_translation_unit(&input.text, &input.path, &options, &self.cancellation).map_err(failure)?;
        let model = bind_unit(&unit, Some(index));
        let mut diagnostics = unit.diagnostics.clone();
        diagnostics.extend(report_problems(&unit, &model));
        Ok(FileOutcome {
            path: input.path.clone(),
            unit: Arc::new(unit),
            model: Arc::new(model),
            diagnostics,
        })
    }
}
