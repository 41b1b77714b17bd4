//! # Type Name Tests
//!
//! Tags, typedefs, enumerations and `auto` deduction.

pub mod deduction;
pub mod tags;
