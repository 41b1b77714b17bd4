//! # Token mapping
//!
//! Translates preprocessing-token kinds into the grammar symbols the driver
//! understands. The mapping is total over what the dialect's preprocessor can
//! produce; anything else means the lexer and grammar disagree and is reported
//! as an [`InternalError`].

use crate::error::InternalError;
use crate::lexer::TokenKind;
use crate::options::Language;
use crate::token::Token;

/// Terminal symbols of the C99 / C++ grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrammarToken {
    Identifier,
    Integer,
    Floating,
    CharConst,
    StringLit,
    UserDefinedLiteral,

    Auto,
    Break,
    Case,
    Char,
    Const,
    Continue,
    Default,
    Do,
    Double,
    Else,
    Enum,
    Extern,
    Float,
    For,
    Goto,
    If,
    Inline,
    Int,
    Long,
    Register,
    Restrict,
    Return,
    Short,
    Signed,
    Sizeof,
    Static,
    Struct,
    Switch,
    Typedef,
    Union,
    Unsigned,
    Void,
    Volatile,
    While,
    Bool,
    Complex,
    Imaginary,

    Class,
    Delete,
    Explicit,
    False,
    Friend,
    Mutable,
    Namespace,
    New,
    Nullptr,
    Operator,
    Private,
    Protected,
    Public,
    Template,
    This,
    True,
    Typename,
    Using,
    Virtual,

    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
    Dot,
    Arrow,
    PlusPlus,
    MinusMinus,
    And,
    Star,
    Plus,
    Minus,
    Tilde,
    Bang,
    Slash,
    Percent,
    LeftShift,
    RightShift,
    LessThan,
    GreaterThan,
    LessThanEqual,
    GreaterThanEqual,
    EqualEqual,
    NotEqual,
    Caret,
    Or,
    AndAnd,
    OrOr,
    Question,
    Colon,
    ColonColon,
    SemiColon,
    DotDotDot,
    Assign,
    StarAssign,
    SlashAssign,
    PercentAssign,
    PlusAssign,
    MinusAssign,
    LeftShiftAssign,
    RightShiftAssign,
    AndAssign,
    CaretAssign,
    OrAssign,
    Comma,

    Invalid,
    EndOfFile,
}

/// A preprocessed token paired with its grammar symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedToken {
    pub grammar: GrammarToken,
    pub token: Token,
}

/// Maps source-token kinds to grammar tokens for one dialect
pub trait TokenMap: Send + Sync {
    fn language(&self) -> Language;

    fn map_kind(&self, kind: TokenKind) -> Result<GrammarToken, InternalError>;

    fn map_token(&self, token: Token) -> Result<MappedToken, InternalError> {
        Ok(MappedToken {
            grammar: self.map_kind(token.kind)?,
            token,
        })
    }

    fn unmapped(&self, kind: TokenKind) -> InternalError {
        InternalError::UnmappedToken {
            kind,
            language: self.language(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct C99TokenMap;

#[derive(Debug, Clone, Copy, Default)]
pub struct CppTokenMap;

/// The token map for a dialect
pub fn token_map(language: Language) -> &'static dyn TokenMap {
    match language {
        Language::C => &C99TokenMap,
        Language::Cpp => &CppTokenMap,
    }
}

impl TokenMap for C99TokenMap {
    fn language(&self) -> Language {
        Language::C
    }

    fn map_kind(&self, kind: TokenKind) -> Result<GrammarToken, InternalError> {
        if let Some(token) = map_shared(kind) {
            return Ok(token);
        }
        match kind {
            TokenKind::Restrict => Ok(GrammarToken::Restrict),
            TokenKind::UnderscoreBool => Ok(GrammarToken::Bool),
            TokenKind::Complex => Ok(GrammarToken::Complex),
            TokenKind::Imaginary => Ok(GrammarToken::Imaginary),
            _ => Err(self.unmapped(kind)),
        }
    }
}

impl TokenMap for CppTokenMap {
    fn language(&self) -> Language {
        Language::Cpp
    }

    fn map_kind(&self, kind: TokenKind) -> Result<GrammarToken, InternalError> {
        if let Some(token) = map_shared(kind) {
            return Ok(token);
        }
        Ok(match kind {
            TokenKind::UserDefinedInteger
            | TokenKind::UserDefinedFloatingPoint
            | TokenKind::UserDefinedString
            | TokenKind::UserDefinedChar => GrammarToken::UserDefinedLiteral,
            TokenKind::ColonColon => GrammarToken::ColonColon,
            TokenKind::Bool => GrammarToken::Bool,
            TokenKind::Class => GrammarToken::Class,
            TokenKind::Delete => GrammarToken::Delete,
            TokenKind::Explicit => GrammarToken::Explicit,
            TokenKind::False => GrammarToken::False,
            TokenKind::Friend => GrammarToken::Friend,
            TokenKind::Mutable => GrammarToken::Mutable,
            TokenKind::Namespace => GrammarToken::Namespace,
            TokenKind::New => GrammarToken::New,
            TokenKind::Nullptr => GrammarToken::Nullptr,
            TokenKind::Operator => GrammarToken::Operator,
            TokenKind::Private => GrammarToken::Private,
            TokenKind::Protected => GrammarToken::Protected,
            TokenKind::Public => GrammarToken::Public,
            TokenKind::Template => GrammarToken::Template,
            TokenKind::This => GrammarToken::This,
            TokenKind::True => GrammarToken::True,
            TokenKind::Typename => GrammarToken::Typename,
            TokenKind::Using => GrammarToken::Using,
            TokenKind::Virtual => GrammarToken::Virtual,
            _ => return Err(self.unmapped(kind)),
        })
    }
}

/// Kinds both dialects map the same way
const fn map_shared(kind: TokenKind) -> Option<GrammarToken> {
    Some(match kind {
        TokenKind::Identifier => GrammarToken::Identifier,
        TokenKind::Integer => GrammarToken::Integer,
        TokenKind::FloatingPoint => GrammarToken::Floating,
        TokenKind::Char | TokenKind::WideChar => GrammarToken::CharConst,
        TokenKind::String | TokenKind::WideString => GrammarToken::StringLit,

        TokenKind::Auto => GrammarToken::Auto,
        TokenKind::Break => GrammarToken::Break,
        TokenKind::Case => GrammarToken::Case,
        TokenKind::CharKw => GrammarToken::Char,
        TokenKind::Const => GrammarToken::Const,
        TokenKind::Continue => GrammarToken::Continue,
        TokenKind::Default => GrammarToken::Default,
        TokenKind::Do => GrammarToken::Do,
        TokenKind::Double => GrammarToken::Double,
        TokenKind::Else => GrammarToken::Else,
        TokenKind::Enum => GrammarToken::Enum,
        TokenKind::Extern => GrammarToken::Extern,
        TokenKind::Float => GrammarToken::Float,
        TokenKind::For => GrammarToken::For,
        TokenKind::Goto => GrammarToken::Goto,
        TokenKind::If => GrammarToken::If,
        TokenKind::Inline => GrammarToken::Inline,
        TokenKind::Int => GrammarToken::Int,
        TokenKind::Long => GrammarToken::Long,
        TokenKind::Register => GrammarToken::Register,
        TokenKind::Return => GrammarToken::Return,
        TokenKind::Short => GrammarToken::Short,
        TokenKind::Signed => GrammarToken::Signed,
        TokenKind::Sizeof => GrammarToken::Sizeof,
        TokenKind::Static => GrammarToken::Static,
        TokenKind::Struct => GrammarToken::Struct,
        TokenKind::Switch => GrammarToken::Switch,
        TokenKind::Typedef => GrammarToken::Typedef,
        TokenKind::Union => GrammarToken::Union,
        TokenKind::Unsigned => GrammarToken::Unsigned,
        TokenKind::Void => GrammarToken::Void,
        TokenKind::Volatile => GrammarToken::Volatile,
        TokenKind::While => GrammarToken::While,

        TokenKind::LParen => GrammarToken::LeftParen,
        TokenKind::RParen => GrammarToken::RightParen,
        TokenKind::LBracket => GrammarToken::LeftBracket,
        TokenKind::RBracket => GrammarToken::RightBracket,
        TokenKind::LBrace => GrammarToken::LeftBrace,
        TokenKind::RBrace => GrammarToken::RightBrace,
        TokenKind::Dot => GrammarToken::Dot,
        TokenKind::Arrow => GrammarToken::Arrow,
        TokenKind::PlusPlus => GrammarToken::PlusPlus,
        TokenKind::MinusMinus => GrammarToken::MinusMinus,
        TokenKind::Amper => GrammarToken::And,
        TokenKind::Star => GrammarToken::Star,
        TokenKind::Plus => GrammarToken::Plus,
        TokenKind::Minus => GrammarToken::Minus,
        TokenKind::BitComplement => GrammarToken::Tilde,
        TokenKind::Not => GrammarToken::Bang,
        TokenKind::Divide => GrammarToken::Slash,
        TokenKind::Percent => GrammarToken::Percent,
        TokenKind::ShiftLeft => GrammarToken::LeftShift,
        TokenKind::ShiftRight => GrammarToken::RightShift,
        TokenKind::Lt => GrammarToken::LessThan,
        TokenKind::Gt => GrammarToken::GreaterThan,
        TokenKind::LtEqual => GrammarToken::LessThanEqual,
        TokenKind::GtEqual => GrammarToken::GreaterThanEqual,
        TokenKind::EqualEqual => GrammarToken::EqualEqual,
        TokenKind::NotEqual => GrammarToken::NotEqual,
        TokenKind::Xor => GrammarToken::Caret,
        TokenKind::BitOr => GrammarToken::Or,
        TokenKind::AndAnd => GrammarToken::AndAnd,
        TokenKind::OrOr => GrammarToken::OrOr,
        TokenKind::Question => GrammarToken::Question,
        TokenKind::Colon => GrammarToken::Colon,
        TokenKind::SemiColon => GrammarToken::SemiColon,
        TokenKind::Ellipsis => GrammarToken::DotDotDot,
        TokenKind::Assign => GrammarToken::Assign,
        TokenKind::StarAssign => GrammarToken::StarAssign,
        TokenKind::DivAssign => GrammarToken::SlashAssign,
        TokenKind::PercentAssign => GrammarToken::PercentAssign,
        TokenKind::PlusAssign => GrammarToken::PlusAssign,
        TokenKind::MinusAssign => GrammarToken::MinusAssign,
        TokenKind::ShiftLeftAssign => GrammarToken::LeftShiftAssign,
        TokenKind::ShiftRightAssign => GrammarToken::RightShiftAssign,
        TokenKind::AmperAssign => GrammarToken::AndAssign,
        TokenKind::XorAssign => GrammarToken::CaretAssign,
        TokenKind::BitOrAssign => GrammarToken::OrAssign,
        TokenKind::Comma => GrammarToken::Comma,

        // Stray `#` outside a directive is a syntax error, not a lexer bug
        TokenKind::Invalid | TokenKind::Hash | TokenKind::HashHash => GrammarToken::Invalid,
        TokenKind::EndOfInput => GrammarToken::EndOfFile,
        _ => return None,
    })
}
