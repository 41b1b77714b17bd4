//! # Indexer Tests
//!
//! - `cli` - Running the `cdom-index` binary
//! - `config_files` - `cdom.toml` discovery and loading from disk
//! - `cross_file` - Indexing the `test_data/index` fixtures together

pub mod common;

pub mod cli;
pub mod config_files;
pub mod cross_file;
