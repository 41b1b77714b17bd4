use thiserror::Error;

use crate::lexer::TokenKind;
use crate::options::Language;

/// A bug in the lexer/grammar/action pairing, never caused by user input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InternalError {
    #[error("token {kind:?} not recognized by the {language} parser")]
    UnmappedToken { kind: TokenKind, language: Language },
    #[error("builder stack out of sync in {action}: expected {expected}")]
    StackDesync {
        action: &'static str,
        expected: &'static str,
    },
    #[error("builder stack empty in {action}")]
    MissingFragment { action: &'static str },
}

/// Why a parse produced no translation unit
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("parse cancelled")]
    Cancelled,
    #[error(transparent)]
    Internal(#[from] InternalError),
}
