//! Dialect-specific node construction.
//!
//! The builder actions are shared between C and C++; the few places where the
//! dialects build different payloads from the same tokens go through a
//! [`NodeFactory`] chosen when the parser is constructed.

use smol_str::SmolStr;

use crate::ast::{
    DeclSpecifier, Literal, LiteralKind, Name, NameKind, Problem, ProblemId, Qualifiers,
    SimpleType, SpecifierFlags, StorageClass, TypeModifiers,
};
use crate::options::Language;
use crate::token_map::{GrammarToken, MappedToken};

pub trait NodeFactory {
    fn language(&self) -> Language;

    fn new_literal(&self, token: &MappedToken) -> Literal {
        Literal {
            kind: literal_kind(token.grammar),
            value: token.token.text.clone(),
            suffix: None,
        }
    }

    fn new_identifier(&self, text: &str) -> Name {
        Name {
            text: text.into(),
            kind: NameKind::Identifier,
        }
    }

    fn new_empty_name(&self) -> Name {
        Name {
            text: SmolStr::default(),
            kind: NameKind::Empty,
        }
    }

    fn new_syntax_problem(&self, text: &str) -> Problem {
        Problem {
            id: ProblemId::SyntaxError,
            is_error: true,
            arguments: text.into(),
        }
    }

    /// Folds one specifier token into `spec`; `false` if the token is not a
    /// specifier of this dialect
    fn apply_specifier(&self, spec: &mut DeclSpecifier, token: GrammarToken) -> bool {
        apply_shared_specifier(spec, token)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CNodeFactory;

#[derive(Debug, Clone, Copy, Default)]
pub struct CppNodeFactory;

impl NodeFactory for CNodeFactory {
    fn language(&self) -> Language {
        Language::C
    }

    fn apply_specifier(&self, spec: &mut DeclSpecifier, token: GrammarToken) -> bool {
        match token {
            GrammarToken::Auto => spec.storage = StorageClass::Auto,
            GrammarToken::Restrict => spec.qualifiers |= Qualifiers::RESTRICT,
            GrammarToken::Bool => spec.simple = SimpleType::Bool,
            GrammarToken::Complex => spec.modifiers |= TypeModifiers::COMPLEX,
            GrammarToken::Imaginary => spec.modifiers |= TypeModifiers::IMAGINARY,
            _ => return apply_shared_specifier(spec, token),
        }
        true
    }
}

impl NodeFactory for CppNodeFactory {
    fn language(&self) -> Language {
        Language::Cpp
    }

    fn new_literal(&self, token: &MappedToken) -> Literal {
        if token.grammar != GrammarToken::UserDefinedLiteral {
            return Literal {
                kind: literal_kind(token.grammar),
                value: token.token.text.clone(),
                suffix: None,
            };
        }
        let (kind, value, suffix) = split_user_defined_literal(&token.token.text);
        Literal {
            kind,
            value: value.into(),
            suffix: Some(suffix.into()),
        }
    }

    fn apply_specifier(&self, spec: &mut DeclSpecifier, token: GrammarToken) -> bool {
        match token {
            GrammarToken::Auto => spec.simple = SimpleType::Auto,
            GrammarToken::Bool => spec.simple = SimpleType::Bool,
            GrammarToken::Virtual => spec.flags |= SpecifierFlags::VIRTUAL,
            GrammarToken::Explicit => spec.flags |= SpecifierFlags::EXPLICIT,
            GrammarToken::Friend => spec.flags |= SpecifierFlags::FRIEND,
            GrammarToken::Mutable => spec.flags |= SpecifierFlags::MUTABLE,
            _ => return apply_shared_specifier(spec, token),
        }
        true
    }
}

const fn literal_kind(token: GrammarToken) -> LiteralKind {
    match token {
        GrammarToken::Floating => LiteralKind::Float,
        GrammarToken::CharConst => LiteralKind::Char,
        GrammarToken::StringLit => LiteralKind::String,
        GrammarToken::True => LiteralKind::True,
        GrammarToken::False => LiteralKind::False,
        GrammarToken::This => LiteralKind::This,
        GrammarToken::Nullptr => LiteralKind::Nullptr,
        _ => LiteralKind::Integer,
    }
}

/// Splits `42_km` into `(Integer, "42", "_km")`, `"ab"_s` into `(String, "\"ab\"", "_s")`
fn split_user_defined_literal(text: &str) -> (LiteralKind, &str, &str) {
    let (kind, value_end) = if text.starts_with('"') {
        (LiteralKind::String, text.rfind('"').map_or(0, |i| i + 1))
    } else if text.starts_with('\'') {
        (LiteralKind::Char, text.rfind('\'').map_or(0, |i| i + 1))
    } else {
        let end = text.find('_').unwrap_or(text.len());
        let is_hex = text.starts_with("0x") || text.starts_with("0X");
        let value = &text[..end];
        let is_float = !is_hex && value.contains(['.', 'e', 'E']);
        let kind = if is_float {
            LiteralKind::Float
        } else {
            LiteralKind::Integer
        };
        (kind, end)
    };
    (kind, &text[..value_end], &text[value_end..])
}

fn apply_shared_specifier(spec: &mut DeclSpecifier, token: GrammarToken) -> bool {
    match token {
        GrammarToken::Typedef => spec.storage = StorageClass::Typedef,
        GrammarToken::Extern => spec.storage = StorageClass::Extern,
        GrammarToken::Static => spec.storage = StorageClass::Static,
        GrammarToken::Register => spec.storage = StorageClass::Register,
        GrammarToken::Const => spec.qualifiers |= Qualifiers::CONST,
        GrammarToken::Volatile => spec.qualifiers |= Qualifiers::VOLATILE,
        GrammarToken::Inline => spec.flags |= SpecifierFlags::INLINE,
        GrammarToken::Void => spec.simple = SimpleType::Void,
        GrammarToken::Char => spec.simple = SimpleType::Char,
        GrammarToken::Int => spec.simple = SimpleType::Int,
        GrammarToken::Float => spec.simple = SimpleType::Float,
        GrammarToken::Double => spec.simple = SimpleType::Double,
        GrammarToken::Short => spec.modifiers |= TypeModifiers::SHORT,
        GrammarToken::Signed => spec.modifiers |= TypeModifiers::SIGNED,
        GrammarToken::Unsigned => spec.modifiers |= TypeModifiers::UNSIGNED,
        GrammarToken::Long if spec.modifiers.contains(TypeModifiers::LONG) => {
            spec.modifiers.remove(TypeModifiers::LONG);
            spec.modifiers |= TypeModifiers::LONG_LONG;
        }
        GrammarToken::Long => spec.modifiers |= TypeModifiers::LONG,
        _ => return false,
    }
    true
}
