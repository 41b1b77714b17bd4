//! # Parser integration tests
//!
//! - `parser/declarators.rs` - declarator promotion and span tracking
//! - `parser/expressions.rs` - precedence, casts, calls and literals
//! - `parser/statements.rs` - statement forms inside function bodies
//! - `parser/recovery.rs` - syntax problems and recovery points
//! - `parser/cpp.rs` - C++ names, templates, constructors and literals
//! - `parser/macros.rs` - macro origins carried onto nodes
//! - `parser/cancellation.rs` - cooperative cancellation and the salsa query

pub mod common;
mod parser;
