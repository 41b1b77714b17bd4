//! # Lexer
//!
//! Preprocessing-token lexer shared by the C and C++ dialects. Keywords of
//! both dialects are recognised here; [`TokenKind::for_dialect`] demotes the
//! ones a dialect does not reserve back to identifiers.

use logos::Logos;

use crate::Language;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[logos(skip r"[ \t\r\f\x0B]+")]
#[logos(skip r"\\\r?\n")]
#[logos(skip r"//[^\n]*")]
pub enum TokenKind {
    /// Line ends are significant for directives and dropped afterwards
    #[token("\n")]
    Newline,

    // Literals
    #[regex(r"[0-9]+[uUlL]*")]
    #[regex(r"0[xX][0-9a-fA-F]+[uUlL]*")]
    Integer,
    #[regex(r"[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?[fFlL]?")]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?[fFlL]?")]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+[fFlL]?")]
    FloatingPoint,
    #[regex(r"'([^'\\\n]|\\.)*'")]
    Char,
    #[regex(r"L'([^'\\\n]|\\.)*'")]
    WideChar,
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    String,
    #[regex(r#"L"([^"\\\n]|\\.)*""#)]
    WideString,
    #[regex(r"[0-9]+_[A-Za-z0-9_]*")]
    #[regex(r"0[xX][0-9a-fA-F]+_[A-Za-z0-9_]*")]
    UserDefinedInteger,
    #[regex(r"[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?_[A-Za-z0-9_]*")]
    UserDefinedFloatingPoint,
    #[regex(r#""([^"\\\n]|\\.)*"_[A-Za-z0-9_]*"#)]
    UserDefinedString,
    #[regex(r"'([^'\\\n]|\\.)*'_[A-Za-z0-9_]*")]
    UserDefinedChar,

    // Keywords shared by C and C++
    #[token("auto")]
    Auto,
    #[token("break")]
    Break,
    #[token("case")]
    Case,
    #[token("char")]
    CharKw,
    #[token("const")]
    Const,
    #[token("continue")]
    Continue,
    #[token("default")]
    Default,
    #[token("do")]
    Do,
    #[token("double")]
    Double,
    #[token("else")]
    Else,
    #[token("enum")]
    Enum,
    #[token("extern")]
    Extern,
    #[token("float")]
    Float,
    #[token("for")]
    For,
    #[token("goto")]
    Goto,
    #[token("if")]
    If,
    #[token("inline")]
    Inline,
    #[token("int")]
    Int,
    #[token("long")]
    Long,
    #[token("register")]
    Register,
    #[token("return")]
    Return,
    #[token("short")]
    Short,
    #[token("signed")]
    Signed,
    #[token("sizeof")]
    Sizeof,
    #[token("static")]
    Static,
    #[token("struct")]
    Struct,
    #[token("switch")]
    Switch,
    #[token("typedef")]
    Typedef,
    #[token("union")]
    Union,
    #[token("unsigned")]
    Unsigned,
    #[token("void")]
    Void,
    #[token("volatile")]
    Volatile,
    #[token("while")]
    While,

    // C99 only
    #[token("restrict")]
    Restrict,
    #[token("_Bool")]
    UnderscoreBool,
    #[token("_Complex")]
    Complex,
    #[token("_Imaginary")]
    Imaginary,

    // C++ only
    #[token("bool")]
    Bool,
    #[token("class")]
    Class,
    #[token("delete")]
    Delete,
    #[token("explicit")]
    Explicit,
    #[token("false")]
    False,
    #[token("friend")]
    Friend,
    #[token("mutable")]
    Mutable,
    #[token("namespace")]
    Namespace,
    #[token("new")]
    New,
    #[token("nullptr")]
    Nullptr,
    #[token("operator")]
    Operator,
    #[token("private")]
    Private,
    #[token("protected")]
    Protected,
    #[token("public")]
    Public,
    #[token("template")]
    Template,
    #[token("this")]
    This,
    #[token("true")]
    True,
    #[token("typename")]
    Typename,
    #[token("using")]
    Using,
    #[token("virtual")]
    Virtual,

    // Identifiers (keywords take priority)
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Identifier,

    // Punctuators
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(".")]
    Dot,
    #[token("->")]
    Arrow,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("&")]
    Amper,
    #[token("*")]
    Star,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("~")]
    BitComplement,
    #[token("!")]
    Not,
    #[token("/")]
    Divide,
    #[token("%")]
    Percent,
    #[token("<<")]
    ShiftLeft,
    #[token(">>")]
    ShiftRight,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("<=")]
    LtEqual,
    #[token(">=")]
    GtEqual,
    #[token("==")]
    EqualEqual,
    #[token("!=")]
    NotEqual,
    #[token("^")]
    Xor,
    #[token("|")]
    BitOr,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("?")]
    Question,
    #[token(":")]
    Colon,
    #[token("::")]
    ColonColon,
    #[token(";")]
    SemiColon,
    #[token("...")]
    Ellipsis,
    #[token("=")]
    Assign,
    #[token("*=")]
    StarAssign,
    #[token("/=")]
    DivAssign,
    #[token("%=")]
    PercentAssign,
    #[token("+=")]
    PlusAssign,
    #[token("-=")]
    MinusAssign,
    #[token("<<=")]
    ShiftLeftAssign,
    #[token(">>=")]
    ShiftRightAssign,
    #[token("&=")]
    AmperAssign,
    #[token("^=")]
    XorAssign,
    #[token("|=")]
    BitOrAssign,
    #[token(",")]
    Comma,
    #[token("#")]
    Hash,
    #[token("##")]
    HashHash,

    /// Never produced; the callback skips the whole comment
    #[token("/*", skip_block_comment)]
    BlockComment,

    /// A character no token starts with
    Invalid,
    /// Synthesised once after the last token
    EndOfInput,
}

impl TokenKind {
    /// Keywords reserved only by C99
    pub const fn is_c_only_keyword(self) -> bool {
        matches!(
            self,
            Self::Restrict | Self::UnderscoreBool | Self::Complex | Self::Imaginary
        )
    }

    /// Keywords reserved only by C++
    pub const fn is_cpp_only_keyword(self) -> bool {
        matches!(
            self,
            Self::Bool
                | Self::Class
                | Self::Delete
                | Self::Explicit
                | Self::False
                | Self::Friend
                | Self::Mutable
                | Self::Namespace
                | Self::New
                | Self::Nullptr
                | Self::Operator
                | Self::Private
                | Self::Protected
                | Self::Public
                | Self::Template
                | Self::This
                | Self::True
                | Self::Typename
                | Self::Using
                | Self::Virtual
        )
    }

    pub const fn is_user_defined_literal(self) -> bool {
        matches!(
            self,
            Self::UserDefinedInteger
                | Self::UserDefinedFloatingPoint
                | Self::UserDefinedString
                | Self::UserDefinedChar
        )
    }

    /// Adjusts a lexed kind to what the dialect actually reserves.
    ///
    /// Returns `None` when the token must be split (`::` in C).
    pub const fn for_dialect(self, language: Language) -> Option<Self> {
        match language {
            Language::C if self.is_cpp_only_keyword() => Some(Self::Identifier),
            Language::C if self.is_user_defined_literal() => Some(Self::Invalid),
            Language::C if matches!(self, Self::ColonColon) => None,
            Language::Cpp if self.is_c_only_keyword() => Some(Self::Identifier),
            _ => Some(self),
        }
    }

    /// Identifiers and keywords; both may name a macro
    pub const fn is_identifier_like(self) -> bool {
        matches!(self, Self::Identifier) || self.is_keyword()
    }

    pub const fn is_keyword(self) -> bool {
        (self as u8) >= (Self::Auto as u8) && (self as u8) <= (Self::Virtual as u8)
    }
}

/// Skips to the closing `*/`, or to the end of input when there is none
fn skip_block_comment(lex: &mut logos::Lexer<TokenKind>) -> logos::Skip {
    let remainder = lex.remainder();
    let len = remainder.find("*/").map_or(remainder.len(), |end| end + 2);
    lex.bump(len);
    logos::Skip
}

/// A raw lexed token: kind plus byte range in the lexed text.
pub type RawToken = (TokenKind, std::ops::Range<usize>);

/// Lex `text` into raw preprocessing tokens, newlines included.
pub fn lex(text: &str) -> Vec<RawToken> {
    TokenKind::lexer(text)
        .spanned()
        .map(|(kind, span)| (kind.unwrap_or(TokenKind::Invalid), span))
        .collect()
}
