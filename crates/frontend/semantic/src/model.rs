//! # Semantic model
//!
//! The result of binding one translation unit: the scope tree, every binding,
//! and the map from name-bearing nodes to the binding they resolve to.
//! The model is frozen once built and is safe to share between threads.

use cdom_parser::{Language, NodeId};
use index_vec::IndexVec;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::binding::{Binding, BindingId, BindingKind, ProblemBinding, ProblemKind, TypeBinding, VariableRole};
use crate::scope::{FileScopeId, LookupQualifier, LookupResult, Namespace, ScopeKind, ScopeTree};
use crate::types::Type;

/// Outcome of declaring a binding in a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declared {
    /// A new entity, or a new member of an overload set
    New(BindingId),
    /// Another declaration of an existing entity, folded into it
    Merged(BindingId),
    /// Conflicts with the existing binding
    Conflict(ProblemKind, BindingId),
}

impl Declared {
    pub const fn binding(self) -> BindingId {
        match self {
            Self::New(id) | Self::Merged(id) | Self::Conflict(_, id) => id,
        }
    }
}

enum Compatibility {
    Merge,
    Overload,
    Conflict(ProblemKind),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticModel {
    language: Language,
    scopes: ScopeTree,
    bindings: IndexVec<BindingId, Binding>,
    /// Name, literal and initializer nodes to the binding they resolve to
    resolutions: FxHashMap<NodeId, BindingId>,
    /// Scopes introduced by function bodies, classes, blocks and namespaces
    node_scopes: FxHashMap<NodeId, FileScopeId>,
    expression_types: FxHashMap<NodeId, Type>,
    /// Composite definitions by qualified name
    composites: FxHashMap<SmolStr, BindingId>,
    macros: Vec<BindingId>,
    /// Bindings imported from the cross-file index, by qualified name
    imported: IndexMap<SmolStr, Vec<BindingId>>,
}

impl SemanticModel {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            scopes: ScopeTree::new(),
            bindings: IndexVec::new(),
            resolutions: FxHashMap::default(),
            node_scopes: FxHashMap::default(),
            expression_types: FxHashMap::default(),
            composites: FxHashMap::default(),
            macros: Vec::new(),
            imported: IndexMap::new(),
        }
    }

    pub const fn language(&self) -> Language {
        self.language
    }

    pub const fn scopes(&self) -> &ScopeTree {
        &self.scopes
    }

    pub fn global_scope(&self) -> FileScopeId {
        self.scopes.global()
    }

    pub fn open_scope(&mut self, parent: FileScopeId, kind: ScopeKind, node: Option<NodeId>, qualified_name: SmolStr) -> FileScopeId {
        let id = self.scopes.open_scope(parent, kind, node, qualified_name);
        if let Some(node) = node {
            self.node_scopes.entry(node).or_insert(id);
        }
        id
    }

    pub fn add_using_directive(&mut self, scope: FileScopeId, nominated: FileScopeId) {
        self.scopes.add_using_directive(scope, nominated);
    }

    /// Scope introduced by `node`, if any
    pub fn scope_of_node(&self, node: NodeId) -> Option<FileScopeId> {
        self.node_scopes.get(&node).copied()
    }

    pub fn binding(&self, id: BindingId) -> &Binding {
        &self.bindings[id]
    }

    pub(crate) fn binding_mut(&mut self, id: BindingId) -> &mut Binding {
        &mut self.bindings[id]
    }

    pub fn bindings(&self) -> impl Iterator<Item = (BindingId, &Binding)> {
        self.bindings.iter_enumerated()
    }

    /// Bindings declared in this unit at global or namespace scope, the ones
    /// other translation units can see
    pub fn file_level_bindings(&self) -> impl Iterator<Item = (BindingId, &Binding)> {
        self.bindings.iter_enumerated().filter(|(_, binding)| {
            !binding.kind.is_problem()
                && !binding.declarations.is_empty()
                && matches!(
                    self.scopes.scope(binding.scope).kind,
                    ScopeKind::Global | ScopeKind::Namespace
                )
        })
    }

    /// Adds a binding without entering it in any symbol table
    pub fn add_binding(&mut self, binding: Binding) -> BindingId {
        self.bindings.push(binding)
    }

    pub fn add_problem(&mut self, problem: ProblemBinding, scope: FileScopeId) -> BindingId {
        let name = problem.name.clone();
        self.bindings.push(Binding::new(
            name.clone(),
            name,
            BindingKind::Problem(problem),
            scope,
            Type::Unknown,
        ))
    }

    pub fn resolution(&self, node: NodeId) -> Option<BindingId> {
        self.resolutions.get(&node).copied()
    }

    /// The binding `node` resolves to, unless it is a problem
    pub fn resolved_binding(&self, node: NodeId) -> Option<&Binding> {
        self.resolution(node)
            .map(|id| self.binding(id))
            .filter(|binding| !binding.kind.is_problem())
    }

    pub fn set_resolution(&mut self, node: NodeId, binding: BindingId) {
        self.resolutions.insert(node, binding);
    }

    /// Problem resolutions, in node order
    pub fn problems(&self) -> Vec<(NodeId, &ProblemBinding)> {
        let mut problems: Vec<_> = self
            .resolutions
            .iter()
            .filter_map(|(&node, &id)| self.bindings[id].problem().map(|p| (node, p)))
            .collect();
        problems.sort_by_key(|(node, _)| *node);
        problems
    }

    pub fn expression_type(&self, node: NodeId) -> Option<&Type> {
        self.expression_types.get(&node)
    }

    pub(crate) fn set_expression_type(&mut self, node: NodeId, ty: Type) {
        self.expression_types.insert(node, ty);
    }

    pub fn composite(&self, qualified_name: &str) -> Option<BindingId> {
        self.composites.get(qualified_name).copied()
    }

    /// Member scope of a defined composite
    pub fn composite_members(&self, qualified_name: &str) -> Option<FileScopeId> {
        let id = self.composite(qualified_name)?;
        match &self.bindings[id].kind {
            BindingKind::Type(TypeBinding::Composite { members, .. }) => *members,
            BindingKind::Template(template) => match template.entity.as_ref() {
                BindingKind::Type(TypeBinding::Composite { members, .. }) => *members,
                _ => None,
            },
            _ => None,
        }
    }

    pub(crate) fn register_composite(&mut self, qualified_name: SmolStr, id: BindingId) {
        self.composites.insert(qualified_name, id);
    }

    pub fn macros(&self) -> &[BindingId] {
        &self.macros
    }

    pub(crate) fn add_macro(&mut self, binding: Binding) -> BindingId {
        let id = self.bindings.push(binding);
        self.macros.push(id);
        id
    }

    pub fn imported(&self, qualified_name: &str) -> Option<&[BindingId]> {
        self.imported.get(qualified_name).map(Vec::as_slice)
    }

    pub(crate) fn add_imported(&mut self, qualified_name: SmolStr, ids: Vec<BindingId>) {
        self.imported.insert(qualified_name, ids);
    }

    pub fn lookup(&self, scope: FileScopeId, namespace: Namespace, name: &str, qualifier: LookupQualifier) -> LookupResult {
        self.scopes.lookup(
            scope,
            namespace,
            name,
            qualifier,
            self.language == Language::Cpp,
        )
    }

    /// Enters `binding` in `scope`, merging it into an existing declaration of
    /// the same entity or reporting a conflict.
    pub fn declare(&mut self, scope: FileScopeId, namespace: Namespace, binding: Binding) -> Declared {
        let existing: Vec<BindingId> = self.scopes.table(scope).get(namespace, &binding.name).to_vec();
        for id in existing {
            match self.compatibility(&self.bindings[id], &binding, scope) {
                Compatibility::Overload => {}
                Compatibility::Merge => {
                    self.merge(id, binding);
                    return Declared::Merged(id);
                }
                Compatibility::Conflict(kind) => return Declared::Conflict(kind, id),
            }
        }
        let name = binding.name.clone();
        let id = self.bindings.push(binding);
        self.scopes.table_mut(scope).insert(namespace, &name, id);
        Declared::New(id)
    }

    fn compatibility(&self, existing: &Binding, new: &Binding, scope: FileScopeId) -> Compatibility {
        use BindingKind as K;
        let both_defined = existing.definition.is_some() && new.definition.is_some();
        let scope_kind = self.scopes.scope(scope).kind;
        match (&existing.kind, &new.kind) {
            (K::Function(_), K::Function(_)) | (K::Template(_), K::Template(_))
                if existing.kind.is_callable_entity() && new.kind.is_callable_entity() =>
            {
                let (Some(a), Some(b)) = (existing.ty.as_function(), new.ty.as_function()) else {
                    return Compatibility::Conflict(ProblemKind::Redefinition);
                };
                if a.same_parameters(b) {
                    if !a.return_type.is_compatible(&b.return_type) {
                        Compatibility::Conflict(ProblemKind::Redefinition)
                    } else if both_defined {
                        Compatibility::Conflict(ProblemKind::Redeclaration)
                    } else {
                        Compatibility::Merge
                    }
                } else if self.language == Language::Cpp {
                    Compatibility::Overload
                } else {
                    Compatibility::Conflict(ProblemKind::Redefinition)
                }
            }
            (K::Function(_), K::Template(_)) | (K::Template(_), K::Function(_))
                if existing.kind.is_callable_entity() && new.kind.is_callable_entity() =>
            {
                Compatibility::Overload
            }
            (K::Variable(a), K::Variable(b)) => {
                if a.role == VariableRole::Parameter || b.role == VariableRole::Parameter {
                    return Compatibility::Conflict(ProblemKind::Redeclaration);
                }
                if !existing.ty.is_compatible(&new.ty) {
                    return Compatibility::Conflict(ProblemKind::Redefinition);
                }
                let file_level = matches!(scope_kind, ScopeKind::Global | ScopeKind::Namespace);
                let externs = a.storage == cdom_parser::ast::StorageClass::Extern
                    || b.storage == cdom_parser::ast::StorageClass::Extern;
                if (file_level || externs) && !(a.initialized && b.initialized) {
                    Compatibility::Merge
                } else {
                    Compatibility::Conflict(ProblemKind::Redeclaration)
                }
            }
            (K::Type(TypeBinding::Typedef), K::Type(TypeBinding::Typedef)) => {
                if existing.ty.is_compatible(&new.ty) {
                    Compatibility::Merge
                } else {
                    Compatibility::Conflict(ProblemKind::Redefinition)
                }
            }
            (
                K::Type(TypeBinding::Composite { key: a, .. }),
                K::Type(TypeBinding::Composite { key: b, .. }),
            ) => {
                let same_key = a == b
                    || (*a != cdom_parser::ast::CompositeKey::Union
                        && *b != cdom_parser::ast::CompositeKey::Union);
                if !same_key {
                    Compatibility::Conflict(ProblemKind::Redefinition)
                } else if both_defined {
                    Compatibility::Conflict(ProblemKind::Redeclaration)
                } else {
                    Compatibility::Merge
                }
            }
            (K::Type(TypeBinding::Enumeration { .. }), K::Type(TypeBinding::Enumeration { .. })) => {
                if both_defined {
                    Compatibility::Conflict(ProblemKind::Redeclaration)
                } else {
                    Compatibility::Merge
                }
            }
            (K::Template(a), K::Template(b)) if a.entity.is_type() && b.entity.is_type() => {
                if both_defined {
                    Compatibility::Conflict(ProblemKind::Redeclaration)
                } else {
                    Compatibility::Merge
                }
            }
            (K::Enumerator { .. }, K::Enumerator { .. })
            | (K::Label, K::Label)
            | (K::Type(TypeBinding::TemplateParameter), K::Type(TypeBinding::TemplateParameter)) => {
                Compatibility::Conflict(ProblemKind::Redeclaration)
            }
            (K::Namespace { .. }, K::Namespace { .. }) => Compatibility::Merge,
            _ => Compatibility::Conflict(ProblemKind::Redefinition),
        }
    }

    fn merge(&mut self, id: BindingId, new: Binding) {
        let existing = &mut self.bindings[id];
        existing.declarations.extend(new.declarations);
        if new.definition.is_some() {
            existing.definition = new.definition;
            // The definition completes forward declarations
            existing.kind = new.kind;
            if !new.ty.is_unknown() {
                existing.ty = new.ty;
            }
        } else if let (BindingKind::Variable(a), BindingKind::Variable(b)) = (&mut existing.kind, &new.kind) {
            a.initialized |= b.initialized;
        }
    }
}
