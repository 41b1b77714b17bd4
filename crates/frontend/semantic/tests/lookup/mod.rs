//! # Lookup Tests
//!
//! Namespaces and using-directives, labels, and out-of-class member definitions.

pub mod labels;
pub mod member_definitions;
pub mod namespaces;
