//! # Semantic Model Tests
//!
//! Queries against the bound model, and lookup through a cross-file index.

pub mod cross_file;
pub mod model_queries;
