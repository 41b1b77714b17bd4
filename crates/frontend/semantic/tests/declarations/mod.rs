//! # Declaration Tests
//!
//! Redeclarations, redefinitions and the merging of compatible declarations.

pub mod redeclarations;
pub mod scopes;
