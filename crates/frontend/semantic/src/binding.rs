//! # Bindings
//!
//! A [`Binding`] is the semantic entity a name refers to. Failed resolutions
//! and conflicting declarations produce bindings too: a
//! [`BindingKind::Problem`] records why the name could not be bound, and the
//! candidates that were considered.

use std::fmt;

use cdom_diagnostics::DiagnosticCode;
use cdom_parser::ast::{CompositeKey, StorageClass};
use cdom_parser::NodeId;
use smol_str::SmolStr;

use crate::scope::FileScopeId;
use crate::types::{ParameterList, Type};

index_vec::define_index_type! {
    /// Index of a binding within one translation unit
    pub struct BindingId = usize;
    MAX_INDEX = usize::MAX;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableRole {
    Global,
    Local,
    Parameter,
    Field,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableBinding {
    pub storage: StorageClass,
    pub role: VariableRole,
    /// Declared with an initializer
    pub initialized: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionBinding {
    /// Trailing parameters with default arguments
    pub default_arguments: usize,
    pub is_method: bool,
    pub is_constructor: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeBinding {
    Typedef,
    Composite {
        key: CompositeKey,
        /// Member scope, once the definition has been seen
        members: Option<FileScopeId>,
    },
    Enumeration {
        /// Enumerator bindings in declaration order
        enumerators: Vec<BindingId>,
        defined: bool,
    },
    /// `typename T` inside a template
    TemplateParameter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateBinding {
    pub parameters: Vec<SmolStr>,
    /// Parameters that carry a default argument
    pub defaults: usize,
    /// The templated function or composite
    pub entity: Box<BindingKind>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingKind {
    Variable(VariableBinding),
    Function(FunctionBinding),
    Type(TypeBinding),
    Enumerator {
        enumeration: Option<BindingId>,
        value: Option<i64>,
    },
    Macro {
        function_like: bool,
    },
    Template(TemplateBinding),
    Label,
    Namespace {
        scope: FileScopeId,
    },
    Problem(ProblemBinding),
}

impl BindingKind {
    pub const fn is_problem(&self) -> bool {
        matches!(self, Self::Problem(_))
    }

    /// Functions and function templates
    pub fn is_callable_entity(&self) -> bool {
        match self {
            Self::Function(_) => true,
            Self::Template(template) => matches!(*template.entity, Self::Function(_)),
            _ => false,
        }
    }

    pub fn is_type(&self) -> bool {
        match self {
            Self::Type(_) => true,
            Self::Template(template) => matches!(*template.entity, Self::Type(_)),
            _ => false,
        }
    }

    pub const fn description(&self) -> &'static str {
        match self {
            Self::Variable(_) => "variable",
            Self::Function(_) => "function",
            Self::Type(_) => "type",
            Self::Enumerator { .. } => "enumerator",
            Self::Macro { .. } => "macro",
            Self::Template(_) => "template",
            Self::Label => "label",
            Self::Namespace { .. } => "namespace",
            Self::Problem(_) => "problem",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: SmolStr,
    pub qualified_name: SmolStr,
    pub kind: BindingKind,
    pub scope: FileScopeId,
    pub ty: Type,
    pub declarations: Vec<NodeId>,
    pub definition: Option<NodeId>,
}

impl Binding {
    pub fn new(name: SmolStr, qualified_name: SmolStr, kind: BindingKind, scope: FileScopeId, ty: Type) -> Self {
        Self {
            name,
            qualified_name,
            kind,
            scope,
            ty,
            declarations: Vec::new(),
            definition: None,
        }
    }

    pub fn declared_at(mut self, node: NodeId) -> Self {
        self.declarations.push(node);
        self
    }

    pub fn defined_at(mut self, node: NodeId) -> Self {
        self.definition = Some(node);
        self
    }

    pub const fn problem(&self) -> Option<&ProblemBinding> {
        match &self.kind {
            BindingKind::Problem(problem) => Some(problem),
            _ => None,
        }
    }

    /// Human-readable signature used in candidate lists
    pub fn signature(&self) -> String {
        match &self.kind {
            BindingKind::Function(FunctionBinding {
                is_constructor: true,
                ..
            }) => match self.ty.as_function() {
                Some(function) => format!("{}({})", self.qualified_name, ParameterList(function)),
                None => self.qualified_name.to_string(),
            },
            BindingKind::Function(_) | BindingKind::Template(_) => match self.ty.as_function() {
                Some(function) => format!(
                    "{} {}({})",
                    function.return_type,
                    self.qualified_name,
                    ParameterList(function)
                ),
                None => self.qualified_name.to_string(),
            },
            BindingKind::Variable(_) | BindingKind::Enumerator { .. } => {
                format!("{} {}", self.ty, self.qualified_name)
            }
            _ => self.qualified_name.to_string(),
        }
    }
}

/// Why a name could not be bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProblemKind {
    AmbiguousReference,
    CircularReference,
    FieldResolutionFailure,
    FunctionResolutionFailure,
    InvalidArguments,
    InvalidTemplateArguments,
    LabelNotFound,
    MemberNotFound,
    MethodResolutionFailure,
    OverloadAmbiguous,
    Redeclaration,
    Redefinition,
    TypeResolutionFailure,
    VariableResolutionFailure,
}

impl ProblemKind {
    pub const ALL: [Self; 14] = [
        Self::AmbiguousReference,
        Self::CircularReference,
        Self::FieldResolutionFailure,
        Self::FunctionResolutionFailure,
        Self::InvalidArguments,
        Self::InvalidTemplateArguments,
        Self::LabelNotFound,
        Self::MemberNotFound,
        Self::MethodResolutionFailure,
        Self::OverloadAmbiguous,
        Self::Redeclaration,
        Self::Redefinition,
        Self::TypeResolutionFailure,
        Self::VariableResolutionFailure,
    ];

    pub const fn code(self) -> DiagnosticCode {
        match self {
            Self::AmbiguousReference => DiagnosticCode::AmbiguousReference,
            Self::CircularReference => DiagnosticCode::CircularReference,
            Self::FieldResolutionFailure => DiagnosticCode::FieldResolutionFailure,
            Self::FunctionResolutionFailure => DiagnosticCode::FunctionResolutionFailure,
            Self::InvalidArguments => DiagnosticCode::InvalidArguments,
            Self::InvalidTemplateArguments => DiagnosticCode::InvalidTemplateArguments,
            Self::LabelNotFound => DiagnosticCode::LabelNotFound,
            Self::MemberNotFound => DiagnosticCode::MemberNotFound,
            Self::MethodResolutionFailure => DiagnosticCode::MethodResolutionFailure,
            Self::OverloadAmbiguous => DiagnosticCode::OverloadAmbiguous,
            Self::Redeclaration => DiagnosticCode::Redeclaration,
            Self::Redefinition => DiagnosticCode::Redefinition,
            Self::TypeResolutionFailure => DiagnosticCode::TypeResolutionFailure,
            Self::VariableResolutionFailure => DiagnosticCode::VariableResolutionFailure,
        }
    }

    /// Message for a problem on `name`
    pub fn message(self, name: &str) -> String {
        match self {
            Self::AmbiguousReference => format!("'{name}' is ambiguous"),
            Self::CircularReference => format!("Circular reference '{name}'"),
            Self::FieldResolutionFailure => format!("Field '{name}' could not be resolved"),
            Self::FunctionResolutionFailure => format!("Function '{name}' could not be resolved"),
            Self::InvalidArguments => format!("Invalid arguments '{name}'"),
            Self::InvalidTemplateArguments => format!("Invalid template argument '{name}'"),
            Self::LabelNotFound => format!("Label statement not found '{name}'"),
            Self::MemberNotFound => format!("Member declaration not found '{name}'"),
            Self::MethodResolutionFailure => format!("Method '{name}' could not be resolved"),
            Self::OverloadAmbiguous => format!("Invalid overload of '{name}'"),
            Self::Redeclaration => format!("Invalid redeclaration of '{name}'"),
            Self::Redefinition => format!("Invalid redefinition of '{name}'"),
            Self::TypeResolutionFailure => format!("Type '{name}' could not be resolved"),
            Self::VariableResolutionFailure => format!("Symbol '{name}' could not be resolved"),
        }
    }
}

impl fmt::Display for ProblemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code().id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemBinding {
    pub kind: ProblemKind,
    pub name: SmolStr,
    /// Bindings that were considered and rejected
    pub candidates: Vec<BindingId>,
}

impl ProblemBinding {
    pub fn new(kind: ProblemKind, name: impl Into<SmolStr>) -> Self {
        Self {
            kind,
            name: name.into(),
            candidates: Vec::new(),
        }
    }

    pub fn with_candidates(mut self, candidates: impl IntoIterator<Item = BindingId>) -> Self {
        self.candidates.extend(candidates);
        self
    }
}
