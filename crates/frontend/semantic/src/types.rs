//! # Portable types
//!
//! Composites and enumerations are referenced by qualified name rather than
//! by binding, so a [`Type`] means the same thing in every translation unit
//! and can travel through the cross-file index.

use std::fmt;

use cdom_parser::ast::{CompositeKey, Qualifiers};
use smol_str::SmolStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IntegerKind {
    Bool,
    Char,
    SignedChar,
    UnsignedChar,
    Short,
    UnsignedShort,
    Int,
    UnsignedInt,
    Long,
    UnsignedLong,
    LongLong,
    UnsignedLongLong,
}

impl IntegerKind {
    /// Integer conversion rank; signed and unsigned variants share a rank
    pub const fn rank(self) -> u8 {
        match self {
            Self::Bool => 0,
            Self::Char | Self::SignedChar | Self::UnsignedChar => 1,
            Self::Short | Self::UnsignedShort => 2,
            Self::Int | Self::UnsignedInt => 3,
            Self::Long | Self::UnsignedLong => 4,
            Self::LongLong | Self::UnsignedLongLong => 5,
        }
    }

    pub const fn is_unsigned(self) -> bool {
        matches!(
            self,
            Self::Bool
                | Self::UnsignedChar
                | Self::UnsignedShort
                | Self::UnsignedInt
                | Self::UnsignedLong
                | Self::UnsignedLongLong
        )
    }

    pub const fn spelling(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Char => "char",
            Self::SignedChar => "signed char",
            Self::UnsignedChar => "unsigned char",
            Self::Short => "short",
            Self::UnsignedShort => "unsigned short",
            Self::Int => "int",
            Self::UnsignedInt => "unsigned int",
            Self::Long => "long",
            Self::UnsignedLong => "unsigned long",
            Self::LongLong => "long long",
            Self::UnsignedLongLong => "unsigned long long",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FloatKind {
    Float,
    Double,
    LongDouble,
}

impl FloatKind {
    pub const fn spelling(self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::Double => "double",
            Self::LongDouble => "long double",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionType {
    pub return_type: Type,
    pub parameters: Vec<Type>,
    pub var_args: bool,
}

impl FunctionType {
    /// Same parameter list, ignoring top-level qualifiers and array/function decay
    pub fn same_parameters(&self, other: &Self) -> bool {
        self.var_args == other.var_args
            && self.parameters.len() == other.parameters.len()
            && self
                .parameters
                .iter()
                .zip(&other.parameters)
                .all(|(a, b)| a.adjusted_parameter() == b.adjusted_parameter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Void,
    Integer(IntegerKind),
    Floating(FloatKind),
    /// `std::nullptr_t`
    Nullptr,
    Pointer(Box<Type>),
    Reference(Box<Type>),
    Array {
        element: Box<Type>,
        size: Option<u64>,
    },
    Function(Box<FunctionType>),
    Composite {
        key: CompositeKey,
        name: SmolStr,
    },
    Enumeration {
        name: SmolStr,
    },
    Qualified {
        qualifiers: Qualifiers,
        inner: Box<Type>,
    },
    /// A template type parameter before substitution
    Dependent(SmolStr),
    /// `auto` before deduction
    Auto,
    /// The type of an erroneous construct; compatible with everything
    Unknown,
}

impl Type {
    pub const INT: Self = Self::Integer(IntegerKind::Int);

    pub fn pointer_to(pointee: Self) -> Self {
        Self::Pointer(Box::new(pointee))
    }

    pub fn reference_to(referee: Self) -> Self {
        Self::Reference(Box::new(referee))
    }

    pub fn function(return_type: Self, parameters: Vec<Self>, var_args: bool) -> Self {
        Self::Function(Box::new(FunctionType {
            return_type,
            parameters,
            var_args,
        }))
    }

    /// `const char *`, the decayed type of a narrow string literal
    pub fn const_char_pointer() -> Self {
        Self::pointer_to(Self::Integer(IntegerKind::Char).qualified(Qualifiers::CONST))
    }

    /// Adds qualifiers, merging with any already present
    pub fn qualified(self, qualifiers: Qualifiers) -> Self {
        if qualifiers.is_empty() {
            return self;
        }
        match self {
            Self::Qualified {
                qualifiers: existing,
                inner,
            } => Self::Qualified {
                qualifiers: existing | qualifiers,
                inner,
            },
            // Qualifiers on a reference or function are ignored
            Self::Reference(_) | Self::Function(_) | Self::Unknown => self,
            other => Self::Qualified {
                qualifiers,
                inner: Box::new(other),
            },
        }
    }

    pub fn qualifiers(&self) -> Qualifiers {
        match self {
            Self::Qualified { qualifiers, .. } => *qualifiers,
            _ => Qualifiers::empty(),
        }
    }

    /// The type without top-level qualifiers
    pub fn unqualified(&self) -> &Self {
        match self {
            Self::Qualified { inner, .. } => inner,
            other => other,
        }
    }

    /// The referred-to type for references, the type itself otherwise
    pub fn non_reference(&self) -> &Self {
        match self {
            Self::Reference(inner) => inner,
            other => other,
        }
    }

    /// Array-to-pointer and function-to-pointer conversion on an rvalue
    pub fn decay(&self) -> Self {
        match self.non_reference().unqualified() {
            Self::Array { element, .. } => Self::Pointer(element.clone()),
            Self::Function(_) => Self::pointer_to(self.non_reference().clone()),
            other => other.clone(),
        }
    }

    /// How a parameter declared with this type is adjusted
    pub fn adjusted_parameter(&self) -> Self {
        match self.unqualified() {
            Self::Array { .. } | Self::Function(_) => self.decay(),
            other => other.clone(),
        }
    }

    pub fn pointee(&self) -> Option<&Self> {
        match self.non_reference().unqualified() {
            Self::Pointer(pointee) => Some(pointee),
            Self::Array { element, .. } => Some(element),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionType> {
        match self.non_reference().unqualified() {
            Self::Function(function) => Some(function),
            Self::Pointer(pointee) => match pointee.unqualified() {
                Self::Function(function) => Some(function),
                _ => None,
            },
            _ => None,
        }
    }

    /// Qualified name of the composite, looking through qualifiers,
    /// references and, when `through_pointer` is set, one pointer
    pub fn composite_name(&self, through_pointer: bool) -> Option<&SmolStr> {
        let ty = self.non_reference().unqualified();
        let ty = match ty {
            Self::Pointer(pointee) if through_pointer => pointee.unqualified(),
            other => other,
        };
        match ty {
            Self::Composite { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn is_integral(&self) -> bool {
        matches!(
            self.non_reference().unqualified(),
            Self::Integer(_) | Self::Enumeration { .. }
        )
    }

    pub fn is_arithmetic(&self) -> bool {
        self.is_integral() || matches!(self.non_reference().unqualified(), Self::Floating(_))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(
            self.non_reference().unqualified(),
            Self::Unknown | Self::Dependent(_)
        )
    }

    pub fn contains_auto(&self) -> bool {
        match self {
            Self::Auto => true,
            Self::Pointer(inner) | Self::Reference(inner) => inner.contains_auto(),
            Self::Qualified { inner, .. } => inner.contains_auto(),
            Self::Array { element, .. } => element.contains_auto(),
            Self::Function(function) => function.return_type.contains_auto(),
            _ => false,
        }
    }

    pub fn is_dependent(&self) -> bool {
        match self {
            Self::Dependent(_) => true,
            Self::Pointer(inner) | Self::Reference(inner) => inner.is_dependent(),
            Self::Qualified { inner, .. } => inner.is_dependent(),
            Self::Array { element, .. } => element.is_dependent(),
            Self::Function(function) => {
                function.return_type.is_dependent()
                    || function.parameters.iter().any(Self::is_dependent)
            }
            _ => false,
        }
    }

    /// Replaces `auto` with the deduced type
    pub fn replace_auto(&self, deduced: &Self) -> Self {
        match self {
            Self::Auto => deduced.clone(),
            Self::Pointer(inner) => Self::Pointer(Box::new(inner.replace_auto(deduced))),
            Self::Reference(inner) => Self::Reference(Box::new(inner.replace_auto(deduced))),
            Self::Qualified { qualifiers, inner } => inner.replace_auto(deduced).qualified(*qualifiers),
            other => other.clone(),
        }
    }

    /// Replaces template parameters by their arguments
    pub fn substitute(&self, arguments: &[(SmolStr, Self)]) -> Self {
        match self {
            Self::Dependent(name) => arguments
                .iter()
                .find(|(parameter, _)| parameter == name)
                .map_or_else(|| self.clone(), |(_, ty)| ty.clone()),
            Self::Pointer(inner) => Self::Pointer(Box::new(inner.substitute(arguments))),
            Self::Reference(inner) => Self::Reference(Box::new(inner.substitute(arguments))),
            Self::Qualified { qualifiers, inner } => {
                inner.substitute(arguments).qualified(*qualifiers)
            }
            Self::Array { element, size } => Self::Array {
                element: Box::new(element.substitute(arguments)),
                size: *size,
            },
            Self::Function(function) => Self::function(
                function.return_type.substitute(arguments),
                function
                    .parameters
                    .iter()
                    .map(|p| p.substitute(arguments))
                    .collect(),
                function.var_args,
            ),
            other => other.clone(),
        }
    }

    /// Whether two declarations of the same entity may carry these types
    pub fn is_compatible(&self, other: &Self) -> bool {
        if self == other || self.is_unknown() || other.is_unknown() {
            return true;
        }
        match (self, other) {
            (
                Self::Array {
                    element: a,
                    size: size_a,
                },
                Self::Array {
                    element: b,
                    size: size_b,
                },
            ) => (size_a.is_none() || size_b.is_none() || size_a == size_b) && a.is_compatible(b),
            (Self::Function(a), Self::Function(b)) => {
                a.return_type.is_compatible(&b.return_type) && a.same_parameters(b)
            }
            (Self::Pointer(a), Self::Pointer(b)) => a.is_compatible(b),
            (
                Self::Qualified {
                    qualifiers: qa,
                    inner: a,
                },
                Self::Qualified {
                    qualifiers: qb,
                    inner: b,
                },
            ) => qa == qb && a.is_compatible(b),
            _ => false,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => write!(f, "void"),
            Self::Integer(kind) => write!(f, "{}", kind.spelling()),
            Self::Floating(kind) => write!(f, "{}", kind.spelling()),
            Self::Nullptr => write!(f, "std::nullptr_t"),
            Self::Pointer(pointee) => match pointee.as_ref() {
                Self::Function(function) => write!(
                    f,
                    "{} (*)({})",
                    function.return_type,
                    ParameterList(function)
                ),
                other => write!(f, "{other} *"),
            },
            Self::Reference(referee) => write!(f, "{referee} &"),
            Self::Array { element, size } => match size {
                Some(size) => write!(f, "{element} [{size}]"),
                None => write!(f, "{element} []"),
            },
            Self::Function(function) => {
                write!(f, "{} ({})", function.return_type, ParameterList(function))
            }
            Self::Composite { key, name } => write!(f, "{key} {name}"),
            Self::Enumeration { name } => write!(f, "enum {name}"),
            Self::Qualified { qualifiers, inner } => {
                let mut words = Vec::new();
                if qualifiers.contains(Qualifiers::CONST) {
                    words.push("const");
                }
                if qualifiers.contains(Qualifiers::VOLATILE) {
                    words.push("volatile");
                }
                if qualifiers.contains(Qualifiers::RESTRICT) {
                    words.push("restrict");
                }
                match inner.as_ref() {
                    Self::Pointer(_) => write!(f, "{inner} {}", words.join(" ")),
                    _ => write!(f, "{} {inner}", words.join(" ")),
                }
            }
            Self::Dependent(name) => write!(f, "{name}"),
            Self::Auto => write!(f, "auto"),
            Self::Unknown => write!(f, "?"),
        }
    }
}

/// `int, char *, ...`
pub struct ParameterList<'a>(pub &'a FunctionType);

impl fmt::Display for ParameterList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for parameter in &self.0.parameters {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{parameter}")?;
            first = false;
        }
        if self.0.var_args {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "...")?;
        }
        Ok(())
    }
}
