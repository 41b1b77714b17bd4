//! # cdom-semantic
//!
//! Name binding for parsed C and C++ translation units.
//!
//! ## Architecture
//!
//! 1. **Scopes & Symbols**: a scope tree whose symbol tables map names to bindings
//! 2. **Binder**: a single source-order pass declaring entities and resolving uses
//! 3. **Resolver**: picks the binding for a name use, or a problem binding saying why not
//! 4. **Reporting**: problem bindings and syntax problems become diagnostics
//!
//! ## Main Queries
//!
//! [`semantic_model`] binds one [`SourceFile`], and [`problem_diagnostics`]
//! reports on it; both are cached by Salsa. Outside a database,
//! [`bind_unit`] binds a [`cdom_parser::ParsedUnit`] against an optional
//! [`CrossFileIndex`].

pub mod binder;
pub mod binding;
pub mod const_eval;
pub mod conversions;
pub mod db;
pub mod index;
pub mod model;
pub mod problem_reporter;
pub mod resolver;
pub mod scope;
pub mod types;

pub use cdom_parser::SourceFile;

pub use binder::bind_unit;
pub use binding::{Binding, BindingId, BindingKind, ProblemBinding, ProblemKind};
pub use db::{problem_diagnostics, semantic_model, SemanticDatabaseImpl, SemanticDb};
pub use index::{BindingKey, CrossFileIndex, IndexedKind, IndexedName, NamespaceKey};
pub use model::SemanticModel;
pub use problem_reporter::{report_problems, Checker, CheckerRegistry};
pub use scope::{FileScopeId, Namespace, ScopeKind};
pub use types::Type;
