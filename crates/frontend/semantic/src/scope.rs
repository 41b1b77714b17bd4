//! # Scopes and symbol tables
//!
//! Scopes form a tree rooted at the file (global) scope. Each scope owns a
//! [`SymbolTable`] mapping `(Namespace, name)` to the bindings declared under
//! that name, kept in declaration order so overload sets and merged
//! redeclarations preserve first-declared-wins.

use std::fmt;
use std::hash::{Hash, Hasher};

use cdom_parser::NodeId;
use hashbrown::HashTable;
use index_vec::IndexVec;
use rustc_hash::FxHasher;
use smallvec::SmallVec;
use smol_str::SmolStr;

use crate::binding::BindingId;

index_vec::define_index_type! {
    /// Index of a scope within one translation unit
    pub struct FileScopeId = usize;
    MAX_INDEX = usize::MAX;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Global,
    Namespace,
    Class,
    Function,
    Block,
    Template,
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::Namespace => write!(f, "namespace"),
            Self::Class => write!(f, "class"),
            Self::Function => write!(f, "function"),
            Self::Block => write!(f, "block"),
            Self::Template => write!(f, "template"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub parent: Option<FileScopeId>,
    pub kind: ScopeKind,
    /// The node that introduced the scope; `None` for the global scope
    pub node: Option<NodeId>,
    /// Qualified name prefix for entities declared here, `a::B` for members of `B` in `a`
    pub qualified_name: SmolStr,
    /// Namespaces nominated by `using namespace`, in directive order
    pub using_directives: Vec<FileScopeId>,
}

impl Scope {
    /// Qualified name of `name` declared in this scope
    pub fn qualify(&self, name: &str) -> SmolStr {
        if self.qualified_name.is_empty() {
            SmolStr::from(name)
        } else {
            SmolStr::from(format!("{}::{name}", self.qualified_name))
        }
    }
}

/// C and C++ keep struct/union/enum tags and labels apart from ordinary identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Ordinary,
    Tag,
    Label,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolEntry {
    pub namespace: Namespace,
    pub name: SmolStr,
    /// Bindings declared under this name, in declaration order
    pub bindings: SmallVec<[BindingId; 2]>,
}

/// Name lookup within a single scope
#[derive(Debug, Default)]
pub struct SymbolTable {
    entries: Vec<SymbolEntry>,
    entry_set: HashTable<usize>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `binding` to the entry for `(namespace, name)`
    pub fn insert(&mut self, namespace: Namespace, name: &str, binding: BindingId) {
        let hash = Self::hash_key(namespace, name);
        let entries = &self.entries;
        if let Some(&index) = self.entry_set.find(hash, |&index| {
            entries[index].namespace == namespace && entries[index].name == name
        }) {
            self.entries[index].bindings.push(binding);
            return;
        }
        let index = self.entries.len();
        self.entries.push(SymbolEntry {
            namespace,
            name: SmolStr::from(name),
            bindings: SmallVec::from_slice(&[binding]),
        });
        let entries = &self.entries;
        self.entry_set.insert_unique(hash, index, |&index| {
            Self::hash_key(entries[index].namespace, &entries[index].name)
        });
    }

    /// Bindings declared under `(namespace, name)`, in declaration order
    pub fn get(&self, namespace: Namespace, name: &str) -> &[BindingId] {
        self.entry_set
            .find(Self::hash_key(namespace, name), |&index| {
                self.entries[index].namespace == namespace && self.entries[index].name == name
            })
            .map_or(&[], |&index| self.entries[index].bindings.as_slice())
    }

    pub fn entries(&self) -> impl Iterator<Item = &SymbolEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn hash_key(namespace: Namespace, name: &str) -> u64 {
        let mut hasher = FxHasher::default();
        namespace.hash(&mut hasher);
        name.hash(&mut hasher);
        hasher.finish()
    }
}

impl Clone for SymbolTable {
    fn clone(&self) -> Self {
        let entries = self.entries.clone();
        let mut entry_set = HashTable::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            let hash = Self::hash_key(entry.namespace, &entry.name);
            entry_set.insert_unique(hash, index, |_| hash);
        }
        Self { entries, entry_set }
    }
}

impl PartialEq for SymbolTable {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for SymbolTable {}

/// Restricts where a lookup searches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupQualifier {
    /// Walk outward from the starting scope
    Unqualified,
    /// Only the given scope and the namespaces it nominates (`A::x`)
    Scope(FileScopeId),
    /// Only the global scope (`::x`)
    Global,
}

/// Every match of a lookup, grouped by the scope level that produced it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupResult {
    levels: Vec<(FileScopeId, SmallVec<[BindingId; 2]>)>,
}

impl LookupResult {
    pub(crate) fn push_level(&mut self, scope: FileScopeId, bindings: SmallVec<[BindingId; 2]>) {
        if !bindings.is_empty() {
            self.levels.push((scope, bindings));
        }
    }

    /// The innermost level with matches; outer declarations are hidden by it
    pub fn visible(&self) -> &[BindingId] {
        self.levels
            .first()
            .map_or(&[], |(_, bindings)| bindings.as_slice())
    }

    /// The scope of the visible level
    pub fn visible_scope(&self) -> Option<FileScopeId> {
        self.levels.first().map(|(scope, _)| *scope)
    }

    /// All matches, innermost first
    pub fn all(&self) -> impl Iterator<Item = BindingId> + '_ {
        self.levels
            .iter()
            .flat_map(|(_, bindings)| bindings.iter().copied())
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

/// Arena of scopes plus their symbol tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeTree {
    scopes: IndexVec<FileScopeId, Scope>,
    tables: IndexVec<FileScopeId, SymbolTable>,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTree {
    /// A tree holding only the global scope
    pub fn new() -> Self {
        let mut scopes = IndexVec::new();
        let mut tables = IndexVec::new();
        scopes.push(Scope {
            parent: None,
            kind: ScopeKind::Global,
            node: None,
            qualified_name: SmolStr::default(),
            using_directives: Vec::new(),
        });
        tables.push(SymbolTable::new());
        Self { scopes, tables }
    }

    pub fn global(&self) -> FileScopeId {
        FileScopeId::new(0)
    }

    pub fn open_scope(
        &mut self,
        parent: FileScopeId,
        kind: ScopeKind,
        node: Option<NodeId>,
        qualified_name: SmolStr,
    ) -> FileScopeId {
        let id = self.scopes.push(Scope {
            parent: Some(parent),
            kind,
            node,
            qualified_name,
            using_directives: Vec::new(),
        });
        self.tables.push(SymbolTable::new());
        id
    }

    pub fn scope(&self, id: FileScopeId) -> &Scope {
        &self.scopes[id]
    }

    pub fn table(&self, id: FileScopeId) -> &SymbolTable {
        &self.tables[id]
    }

    pub(crate) fn table_mut(&mut self, id: FileScopeId) -> &mut SymbolTable {
        &mut self.tables[id]
    }

    pub fn add_using_directive(&mut self, scope: FileScopeId, nominated: FileScopeId) {
        let directives = &mut self.scopes[scope].using_directives;
        if !directives.contains(&nominated) {
            directives.push(nominated);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (FileScopeId, &Scope)> {
        self.scopes.iter_enumerated()
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Scopes from `scope` outward to the global scope
    pub fn ancestors(&self, scope: FileScopeId) -> impl Iterator<Item = FileScopeId> + '_ {
        std::iter::successors(Some(scope), |&id| self.scopes[id].parent)
    }

    /// The nearest enclosing scope of `kind`, `scope` included
    pub fn enclosing(&self, scope: FileScopeId, kind: ScopeKind) -> Option<FileScopeId> {
        self.ancestors(scope)
            .find(|&id| self.scopes[id].kind == kind)
    }

    /// Matches at a single scope level, including nominated namespaces.
    ///
    /// With `tags_as_types` set, an ordinary lookup also sees tag names when
    /// no ordinary name matches at this level, so a C++ class name is found
    /// unless a variable or function of the same name hides it.
    pub fn level_matches(
        &self,
        scope: FileScopeId,
        namespace: Namespace,
        name: &str,
        tags_as_types: bool,
    ) -> SmallVec<[BindingId; 2]> {
        let mut matches = SmallVec::new();
        let mut visited = vec![scope];
        self.collect_level(scope, namespace, name, &mut matches, &mut visited);
        if matches.is_empty() && tags_as_types && namespace == Namespace::Ordinary {
            let mut visited = vec![scope];
            self.collect_level(scope, Namespace::Tag, name, &mut matches, &mut visited);
        }
        matches
    }

    fn collect_level(
        &self,
        scope: FileScopeId,
        namespace: Namespace,
        name: &str,
        out: &mut SmallVec<[BindingId; 2]>,
        visited: &mut Vec<FileScopeId>,
    ) {
        for &binding in self.tables[scope].get(namespace, name) {
            if !out.contains(&binding) {
                out.push(binding);
            }
        }
        for &nominated in &self.scopes[scope].using_directives {
            if visited.contains(&nominated) {
                continue;
            }
            visited.push(nominated);
            self.collect_level(nominated, namespace, name, out, visited);
        }
    }

    /// Walks outward collecting every match; never fails
    pub fn lookup(
        &self,
        scope: FileScopeId,
        namespace: Namespace,
        name: &str,
        qualifier: LookupQualifier,
        tags_as_types: bool,
    ) -> LookupResult {
        let mut result = LookupResult::default();
        match qualifier {
            LookupQualifier::Unqualified => {
                for level in self.ancestors(scope) {
                    result.push_level(
                        level,
                        self.level_matches(level, namespace, name, tags_as_types),
                    );
                }
            }
            LookupQualifier::Scope(target) => {
                result.push_level(
                    target,
                    self.level_matches(target, namespace, name, tags_as_types),
                );
            }
            LookupQualifier::Global => {
                let global = self.global();
                result.push_level(
                    global,
                    self.level_matches(global, namespace, name, tags_as_types),
                );
            }
        }
        result
    }
}
