//! Implicit conversion ranking for argument matching

use cdom_parser::ast::Qualifiers;
use cdom_parser::Language;

use crate::types::{FloatKind, IntegerKind, Type};

/// How well an argument matches a parameter; earlier is better
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rank {
    Exact,
    Promotion,
    Standard,
    UserDefined,
    Ellipsis,
}

/// What the resolver knows about one call argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub ty: Type,
    /// A literal `0` or `nullptr`
    pub is_null_constant: bool,
}

impl Argument {
    pub const fn new(ty: Type) -> Self {
        Self {
            ty,
            is_null_constant: false,
        }
    }
}

/// Rank of the standard conversion from `argument` to `parameter`, `None`
/// when no standard conversion exists. User-defined conversions are left
/// to the caller, which knows the constructors in scope.
pub fn standard_conversion(argument: &Argument, parameter: &Type, language: Language) -> Option<Rank> {
    if argument.ty.is_unknown() || parameter.is_unknown() {
        return Some(Rank::Exact);
    }
    if let Type::Reference(referee) = parameter {
        return reference_binding(argument, referee, language);
    }

    let from = argument.ty.decay();
    let from = from.unqualified();
    let to = parameter.unqualified();
    if from == to {
        return Some(Rank::Exact);
    }

    match (from, to) {
        (Type::Integer(kind), Type::Integer(IntegerKind::Int))
            if kind.rank() < IntegerKind::Int.rank() =>
        {
            Some(Rank::Promotion)
        }
        (Type::Enumeration { .. }, Type::Integer(IntegerKind::Int)) => Some(Rank::Promotion),
        (Type::Floating(FloatKind::Float), Type::Floating(FloatKind::Double)) => {
            Some(Rank::Promotion)
        }
        (Type::Integer(_) | Type::Enumeration { .. } | Type::Floating(_), Type::Integer(_) | Type::Floating(_)) => {
            Some(Rank::Standard)
        }
        (Type::Integer(_), Type::Enumeration { .. }) if language == Language::C => {
            Some(Rank::Standard)
        }
        (Type::Nullptr, Type::Pointer(_)) => Some(Rank::Standard),
        (Type::Integer(_), Type::Pointer(_))
            if argument.is_null_constant || language == Language::C =>
        {
            Some(Rank::Standard)
        }
        (Type::Pointer(_) | Type::Nullptr, Type::Integer(IntegerKind::Bool)) => Some(Rank::Standard),
        (Type::Pointer(_), Type::Integer(_)) if language == Language::C => Some(Rank::Standard),
        (Type::Pointer(a), Type::Pointer(b)) => pointer_conversion(a, b, language),
        (Type::Composite { name: a, .. }, Type::Composite { name: b, .. }) if a == b => {
            Some(Rank::Exact)
        }
        _ => None,
    }
}

fn pointer_conversion(from: &Type, to: &Type, language: Language) -> Option<Rank> {
    if from.is_unknown() || to.is_unknown() {
        return Some(Rank::Exact);
    }
    let adds_qualifiers = to.qualifiers().contains(from.qualifiers());
    if from.unqualified() == to.unqualified() {
        return if adds_qualifiers || language == Language::C {
            Some(Rank::Exact)
        } else {
            None
        };
    }
    if matches!(to.unqualified(), Type::Void) && (adds_qualifiers || language == Language::C) {
        return Some(Rank::Standard);
    }
    match language {
        Language::C => Some(Rank::Standard),
        Language::Cpp => None,
    }
}

fn reference_binding(argument: &Argument, referee: &Type, language: Language) -> Option<Rank> {
    let from = argument.ty.non_reference();
    if from.unqualified() == referee.unqualified() && referee.qualifiers().contains(from.qualifiers()) {
        return Some(Rank::Exact);
    }
    // Only const references bind to converted temporaries
    if referee.qualifiers().contains(Qualifiers::CONST) {
        let value = Argument {
            ty: from.clone(),
            is_null_constant: argument.is_null_constant,
        };
        return standard_conversion(&value, referee.unqualified(), language);
    }
    None
}
