//! # cdom-indexer
//!
//! Parses and binds many C and C++ translation units on a worker pool and
//! publishes their file-level names into a [`SharedIndex`], so later binding
//! runs resolve names declared in other files.
//!
//! Configuration comes from `cdom.toml` ([`IndexerConfig`]); the `cdom-index`
//! binary drives a run from the command line.

pub mod config;
pub mod index;
pub mod indexer;

pub use config::{ConfigError, DiagnosticsConfig, IndexerConfig, CONFIG_FILE_NAME};
pub use index::{FileIndex, IndexSnapshot, SharedIndex};
pub use indexer::{FileFailure, FileOutcome, IndexError, IndexRun, Indexer, SourceInput};
