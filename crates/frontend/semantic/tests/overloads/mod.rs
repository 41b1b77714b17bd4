//! # Overload Resolution Tests
//!
//! Argument matching for calls and explicit or deduced template arguments.

pub mod function_calls;
pub mod templates;
