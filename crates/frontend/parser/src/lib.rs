//! # cdom-parser
//!
//! C99 / C++ front-end: preprocessing, token mapping and AST construction.
//!
//! ```text
//! source text ──preprocess──▶ tokens ──TokenMap──▶ grammar tokens
//!            ──Parser──▶ BuildAstAction::consume_* ──▶ Ast
//! ```
//!
//! [`parse_translation_unit`] runs the whole pipeline for one file and returns
//! a [`ParsedUnit`]. Each call owns all of its state, so files can be parsed
//! on any number of threads at once.

pub mod action;
pub mod ast;
pub mod cancel;
pub mod db;
pub mod driver;
pub mod error;
pub mod lexer;
pub mod node_factory;
pub mod options;
pub mod preprocessor;
pub mod scoped_stack;
pub mod token;
pub mod token_map;

use cdom_diagnostics::Diagnostic;
use index_vec::IndexVec;

pub use ast::{Ast, NodeId, NodeKind};
pub use cancel::CancellationToken;
pub use db::{parse_file, ParserDatabaseImpl, ParserDb, SourceFile, Upcast};
pub use error::{InternalError, ParseError};
pub use options::{Language, ParserOptions};
pub use token::{ExpansionId, MacroDefinition, MacroExpansion, TokenOrigin};

use crate::driver::parse_tokens;
use crate::node_factory::{CNodeFactory, CppNodeFactory};
use crate::preprocessor::preprocess;
use crate::token_map::token_map;

/// One parsed translation unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUnit {
    pub file_path: String,
    pub language: Language,
    pub ast: Ast,
    /// The translation unit node
    pub root: NodeId,
    pub expansions: IndexVec<ExpansionId, MacroExpansion>,
    pub macros: Vec<MacroDefinition>,
    /// Preprocessor diagnostics
    pub diagnostics: Vec<Diagnostic>,
}

impl ParsedUnit {
    pub fn expansion(&self, id: ExpansionId) -> &MacroExpansion {
        &self.expansions[id]
    }

    /// Syntax problem nodes in source order
    pub fn problems(&self) -> Vec<NodeId> {
        self.ast
            .preorder(self.root)
            .into_iter()
            .filter(|&id| matches!(self.ast.kind(id), NodeKind::Problem(_)))
            .collect()
    }
}

/// Preprocesses and parses one file.
///
/// Returns [`ParseError::Cancelled`] when `cancel` fires before the parse
/// completes, and [`ParseError::Internal`] when the token map and grammar
/// disagree; in both cases no partial tree escapes.
pub fn parse_translation_unit(
    text: &str,
    file_path: &str,
    options: &ParserOptions,
    cancel: &CancellationToken,
) -> Result<ParsedUnit, ParseError> {
    let _span = tracing::trace_span!("parse", file = file_path).entered();
    let language = options.language;
    let preprocessed = preprocess(text, file_path, language);

    let map = token_map(language);
    let tokens = preprocessed
        .tokens
        .into_iter()
        .map(|token| map.map_token(token))
        .collect::<Result<Vec<_>, _>>()?;

    let (ast, root) = match language {
        Language::C => parse_tokens(&tokens, CNodeFactory, options, cancel)?,
        Language::Cpp => parse_tokens(&tokens, CppNodeFactory, options, cancel)?,
    };
    tracing::debug!(file = file_path, nodes = ast.len(), "parsed translation unit");

    Ok(ParsedUnit {
        file_path: file_path.to_string(),
        language,
        ast,
        root,
        expansions: preprocessed.expansions,
        macros: preprocessed.macros,
        diagnostics: preprocessed.diagnostics,
    })
}
