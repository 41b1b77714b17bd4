//! Tokens as delivered to the parser, with their logical origin.

use chumsky::span::SimpleSpan;
use smol_str::SmolStr;

use crate::lexer::TokenKind;

index_vec::define_index_type! {
    /// Index of a macro expansion within one translation unit
    pub struct ExpansionId = u32;
}

/// Where a token came from after preprocessing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TokenOrigin {
    /// Written in the file at its own span
    #[default]
    Source,
    /// Written in the file as part of a macro argument; keeps its own span
    MacroArgument(ExpansionId),
    /// Produced by a macro replacement list; carries the invocation span
    MacroBody(ExpansionId),
}

impl TokenOrigin {
    pub const fn expansion(self) -> Option<ExpansionId> {
        match self {
            Self::Source => None,
            Self::MacroArgument(id) | Self::MacroBody(id) => Some(id),
        }
    }
}

/// An immutable, fully preprocessed token
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub text: SmolStr,
    /// Byte range in the logical source
    pub span: SimpleSpan<usize>,
    pub origin: TokenOrigin,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<SmolStr>, span: SimpleSpan<usize>) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
            origin: TokenOrigin::Source,
        }
    }

    pub const fn with_origin(mut self, origin: TokenOrigin) -> Self {
        self.origin = origin;
        self
    }
}

/// One macro invocation site
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MacroExpansion {
    pub macro_name: SmolStr,
    /// Span of the macro name at the invocation
    pub name_span: SimpleSpan<usize>,
    /// From the macro name through the closing parenthesis
    pub invocation_span: SimpleSpan<usize>,
    /// Between the parentheses of a function-like invocation
    pub arguments_span: Option<SimpleSpan<usize>>,
    pub parent: Option<ExpansionId>,
}

/// A `#define` seen while preprocessing
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MacroDefinition {
    pub name: SmolStr,
    pub name_span: SimpleSpan<usize>,
    /// `None` for object-like macros
    pub parameters: Option<Vec<SmolStr>>,
    pub variadic: bool,
    pub replacement: Vec<(TokenKind, SmolStr)>,
}

impl MacroDefinition {
    pub const fn is_function_like(&self) -> bool {
        self.parameters.is_some()
    }

    fn parameter_index(&self, text: &str) -> Option<usize> {
        let parameters = self.parameters.as_ref()?;
        if self.variadic && text == "__VA_ARGS__" {
            return Some(parameters.len());
        }
        parameters.iter().position(|p| p == text)
    }

    pub(crate) fn argument_slot(&self, kind: TokenKind, text: &str) -> Option<usize> {
        if kind.is_identifier_like() {
            self.parameter_index(text)
        } else {
            None
        }
    }
}
