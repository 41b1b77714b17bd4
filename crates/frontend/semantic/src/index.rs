//! Cross-file name lookup consulted when a file-level name is not declared
//! in the translation unit being bound.

use chumsky::span::SimpleSpan;
use smol_str::SmolStr;

use crate::binding::{Binding, BindingKind, FunctionBinding, TypeBinding, VariableBinding, VariableRole};
use crate::scope::{FileScopeId, Namespace};
use crate::types::Type;

/// What an index entry is keyed by
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingKey {
    pub namespace: NamespaceKey,
    pub qualified_name: SmolStr,
}

/// [`Namespace`] with a total order, for sorted index buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NamespaceKey {
    Ordinary,
    Tag,
}

impl From<Namespace> for NamespaceKey {
    fn from(namespace: Namespace) -> Self {
        match namespace {
            Namespace::Tag => Self::Tag,
            Namespace::Ordinary | Namespace::Label => Self::Ordinary,
        }
    }
}

impl BindingKey {
    pub fn new(namespace: Namespace, qualified_name: impl Into<SmolStr>) -> Self {
        Self {
            namespace: namespace.into(),
            qualified_name: qualified_name.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexedKind {
    Variable,
    Function,
    Typedef,
    Composite,
    Enumeration,
    Enumerator,
}

/// A declaration or definition recorded by the indexer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedName {
    pub file_path: String,
    pub name: SmolStr,
    pub qualified_name: SmolStr,
    pub kind: IndexedKind,
    pub ty: Type,
    pub span: SimpleSpan<usize>,
    pub is_definition: bool,
}

impl IndexedName {
    /// Indexable view of a file-level binding; `None` for entities that do
    /// not cross translation units
    pub fn from_binding(binding: &Binding, file_path: &str, span: SimpleSpan<usize>) -> Option<Self> {
        let kind = match &binding.kind {
            BindingKind::Variable(variable) if variable.role == VariableRole::Global => IndexedKind::Variable,
            BindingKind::Function(_) => IndexedKind::Function,
            BindingKind::Type(TypeBinding::Typedef) => IndexedKind::Typedef,
            BindingKind::Type(TypeBinding::Composite { .. }) => IndexedKind::Composite,
            BindingKind::Type(TypeBinding::Enumeration { .. }) => IndexedKind::Enumeration,
            BindingKind::Enumerator { .. } => IndexedKind::Enumerator,
            _ => return None,
        };
        Some(Self {
            file_path: file_path.to_string(),
            name: binding.name.clone(),
            qualified_name: binding.qualified_name.clone(),
            kind,
            ty: binding.ty.clone(),
            span,
            is_definition: binding.definition.is_some(),
        })
    }

    pub const fn namespace(&self) -> Namespace {
        match self.kind {
            IndexedKind::Composite | IndexedKind::Enumeration => Namespace::Tag,
            _ => Namespace::Ordinary,
        }
    }

    pub fn key(&self) -> BindingKey {
        BindingKey::new(self.namespace(), self.qualified_name.clone())
    }

    /// A binding standing in for this entry in another translation unit
    pub fn to_binding(&self, scope: FileScopeId) -> Binding {
        let kind = match self.kind {
            IndexedKind::Variable => BindingKind::Variable(VariableBinding {
                storage: cdom_parser::ast::StorageClass::Extern,
                role: VariableRole::Global,
                initialized: self.is_definition,
            }),
            IndexedKind::Function => BindingKind::Function(FunctionBinding::default()),
            IndexedKind::Typedef => BindingKind::Type(TypeBinding::Typedef),
            IndexedKind::Composite => BindingKind::Type(TypeBinding::Composite {
                key: match &self.ty {
                    Type::Composite { key, .. } => *key,
                    _ => cdom_parser::ast::CompositeKey::Struct,
                },
                members: None,
            }),
            IndexedKind::Enumeration => BindingKind::Type(TypeBinding::Enumeration {
                enumerators: Vec::new(),
                defined: self.is_definition,
            }),
            IndexedKind::Enumerator => BindingKind::Enumerator {
                enumeration: None,
                value: None,
            },
        };
        Binding::new(self.name.clone(), self.qualified_name.clone(), kind, scope, self.ty.clone())
    }
}

/// Read access to declarations in other translation units
pub trait CrossFileIndex: Send + Sync {
    fn find_definitions(&self, key: &BindingKey) -> Vec<IndexedName>;
    fn find_declarations(&self, key: &BindingKey) -> Vec<IndexedName>;
}
