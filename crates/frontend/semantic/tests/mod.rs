//! # Binding Tests
//!
//! Tests for name binding organized by concern.
//!
//! ## Test Organization
//!
//! - `problem_bindings/` - Unresolved fields, functions, methods and literal operators
//! - `declarations/` - Redeclarations, redefinitions and overloads
//! - `lookup/` - Namespaces, using-directives, labels and member definitions
//! - `overloads/` - Argument matching and template arguments
//! - `types/` - Tags, typedefs, enums and `auto`
//! - `macros/` - Problems reported through macro expansions
//! - `semantic_model/` - Model queries, idempotence and cross-file lookup
//! - `mdtest_runner` - Markdown test files under `mdtest/`
//!
//! ## Test Utilities
//!
//! - `assert_problems!(Cpp, code, [(line, Kind), ...])` - Assert exactly these problems are reported
//! - `assert_clean!(C, code)` - Assert code binds without problems

pub mod common;
pub use common::*;

/// Asserts that a snippet reports exactly the listed `(line, ProblemKind)` pairs
#[macro_export]
macro_rules! assert_problems {
    ($lang:ident, $code:expr, [$(($line:expr, $kind:ident)),* $(,)?]) => {{
        let function_name = stdext::function_name!();
        $crate::assert_problems_impl(
            cdom_parser::Language::$lang,
            $code,
            &[$(($line, cdom_semantic::ProblemKind::$kind)),*],
            function_name,
        )
    }};
}

/// Asserts that a snippet binds without any problem
#[macro_export]
macro_rules! assert_clean {
    ($lang:ident, $code:expr) => {{
        let function_name = stdext::function_name!();
        $crate::assert_problems_impl(cdom_parser::Language::$lang, $code, &[], function_name)
    }};
}

// Test modules organized by concern
pub mod declarations;
pub mod lookup;
pub mod macros;
pub mod mdtest_runner;
pub mod overloads;
pub mod problem_bindings;
pub mod semantic_model;
pub mod types;
