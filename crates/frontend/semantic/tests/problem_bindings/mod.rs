//! # Problem Binding Tests
//!
//! Names that cannot be bound, reported with the kind matching where they
//! were used.

pub mod member_access;
pub mod literal_operators;
