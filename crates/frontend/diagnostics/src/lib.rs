//! # Diagnostics
//!
//! Shared diagnostic types for the C/C++ front-end: syntax problems produced
//! while building the AST, preprocessor directive problems and the problem
//! bindings produced by name resolution all end up as [`Diagnostic`]s.

mod diagnostics;
mod line_index;
mod reporting;

pub use diagnostics::*;
pub use line_index::{LineIndex, Marker};
pub use reporting::build_diagnostic_message;
