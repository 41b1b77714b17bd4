//! # Binder
//!
//! Walks a parsed translation unit in source order, declaring every entity in
//! its scope, computing expression types and resolving each name use through
//! the [`Resolver`]. Inline member function bodies are bound after their class
//! is complete, so members declared later in the class are visible in them.
//!
//! Every name-bearing node is visited once; its resolution (a binding or a
//! problem binding) is recorded in the [`SemanticModel`].

use std::mem;

use cdom_parser::ast::{
    ArrayModifier, BinaryOp, CompositeSpecifier, DeclSpecifier, Declaration, DeclaratorKind,
    ElaboratedKey, ElaboratedSpecifier, EnumerationSpecifier, Expression, Initializer, Literal,
    LiteralKind, Name, NameKind, NodeKind, PointerKind, Qualifiers, SimpleType, Statement, StorageClass,
    TypeModifiers, UnaryOp,
};
use cdom_parser::{Ast, Language, NodeId, ParsedUnit};
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;

use crate::binding::{
    Binding, BindingId, BindingKind, FunctionBinding, ProblemBinding, ProblemKind, TemplateBinding, TypeBinding,
    VariableBinding, VariableRole,
};
use crate::const_eval;
use crate::conversions::Argument;
use crate::index::{BindingKey, CrossFileIndex};
use crate::resolver::{composite_members_of, Request, Resolved, Resolver, Substitution, UseSite};
use crate::scope::{FileScopeId, LookupQualifier, Namespace, ScopeKind};
use crate::model::{Declared, SemanticModel};
use crate::types::{FloatKind, IntegerKind, Type};

/// Binds one translation unit. `index` is consulted for file-level names the
/// unit does not declare itself.
pub fn bind_unit(unit: &ParsedUnit, index: Option<&dyn CrossFileIndex>) -> SemanticModel {
    let _span = tracing::trace_span!("bind", file = unit.file_path.as_str()).entered();
    let mut binder = Binder::new(unit, index);
    binder.bind();
    let model = binder.model;
    tracing::debug!(
        file = unit.file_path.as_str(),
        scopes = model.scopes().len(),
        problems = model.problems().len(),
        "bound translation unit"
    );
    model
}

/// A name split into what lookup needs
struct NameParts<'a> {
    text: &'a str,
    /// The node the resolution is recorded on
    target: NodeId,
    qualifier: LookupQualifier,
    template_arguments: Option<&'a [NodeId]>,
}

struct Binder<'a> {
    unit: &'a ParsedUnit,
    ast: &'a Ast,
    index: Option<&'a dyn CrossFileIndex>,
    model: SemanticModel,
    scope: FileScopeId,
    /// Bindings whose `auto` type is being deduced
    visiting: FxHashSet<BindingId>,
    /// Types of already-processed declaration specifiers
    spec_types: FxHashMap<NodeId, Type>,
    /// Template parameter names and default count, waiting for the templated entity
    pending_template: Option<(Vec<SmolStr>, usize)>,
}

impl<'a> Binder<'a> {
    fn new(unit: &'a ParsedUnit, index: Option<&'a dyn CrossFileIndex>) -> Self {
        let model = SemanticModel::new(unit.language);
        let scope = model.global_scope();
        Self {
            unit,
            ast: &unit.ast,
            index,
            model,
            scope,
            visiting: FxHashSet::default(),
            spec_types: FxHashMap::default(),
            pending_template: None,
        }
    }

    fn language(&self) -> Language {
        self.model.language()
    }

    fn bind(&mut self) {
        let global = self.model.global_scope();
        for definition in &self.unit.macros {
            self.model.add_macro(Binding::new(
                definition.name.clone(),
                definition.name.clone(),
                BindingKind::Macro {
                    function_like: definition.is_function_like(),
                },
                global,
                Type::Unknown,
            ));
        }
        let ast = self.ast;
        let Some(unit) = ast.translation_unit(self.unit.root) else {
            return;
        };
        for &declaration in &unit.declarations {
            self.declaration(declaration);
        }
    }

    // ---------------------------------------------------------------------
    // Recording
    // ---------------------------------------------------------------------

    fn record(&mut self, target: NodeId, resolved: Resolved) -> Option<(BindingId, Substitution)> {
        match resolved {
            Resolved::Binding {
                binding,
                substitution,
            } => {
                self.model.set_resolution(target, binding);
                Some((binding, substitution))
            }
            Resolved::Problem(problem) => {
                self.record_problem(target, problem);
                None
            }
        }
    }

    fn record_problem(&mut self, target: NodeId, problem: ProblemBinding) {
        tracing::trace!(kind = %problem.kind, name = problem.name.as_str(), "problem binding");
        let id = self.model.add_problem(problem, self.scope);
        self.model.set_resolution(target, id);
    }

    /// Records the outcome of a declaration on its name node
    fn record_declared(&mut self, name: NodeId, text: &str, declared: Declared) -> Option<BindingId> {
        match declared {
            Declared::New(id) | Declared::Merged(id) => {
                self.model.set_resolution(name, id);
                Some(id)
            }
            Declared::Conflict(kind, existing) => {
                self.record_problem(name, ProblemBinding::new(kind, text).with_candidates([existing]));
                None
            }
        }
    }

    // ---------------------------------------------------------------------
    // Scopes and names
    // ---------------------------------------------------------------------

    /// Where declarations made now land; template scopes only hold parameters
    fn declaration_scope(&self) -> FileScopeId {
        let scopes = self.model.scopes();
        scopes
            .ancestors(self.scope)
            .find(|&id| scopes.scope(id).kind != ScopeKind::Template)
            .unwrap_or_else(|| scopes.global())
    }

    fn enter_scope(&mut self, kind: ScopeKind, node: NodeId) -> FileScopeId {
        let prefix = self.model.scopes().scope(self.scope).qualified_name.clone();
        let scope = self.model.open_scope(self.scope, kind, Some(node), prefix);
        mem::replace(&mut self.scope, scope)
    }

    fn qualify(&self, scope: FileScopeId, name: &str) -> SmolStr {
        self.model.scopes().scope(scope).qualify(name)
    }

    /// Name text, target node and template arguments of an unqualified name
    fn simple_parts(&self, name: NodeId) -> (&'a str, NodeId, Option<&'a [NodeId]>) {
        let ast = self.ast;
        match ast.name(name).map(|n| &n.kind) {
            Some(NameKind::TemplateId {
                template,
                arguments,
            }) => (ast.name_text(*template), *template, Some(arguments.as_slice())),
            _ => (ast.name_text(name), name, None),
        }
    }

    /// Splits a name, resolving the scopes named by its qualifier. Returns
    /// `None` when a qualifier segment cannot be resolved; that segment then
    /// carries the problem.
    fn analyze_name(&mut self, name: NodeId) -> Option<NameParts<'a>> {
        let ast = self.ast;
        match ast.name(name).map(|n| &n.kind) {
            Some(NameKind::Qualified {
                segments,
                fully_qualified,
            }) => {
                let (&last, prefix) = segments.split_last()?;
                let mut qualifier = if *fully_qualified {
                    LookupQualifier::Global
                } else {
                    LookupQualifier::Unqualified
                };
                for &segment in prefix {
                    let scope = self.qualifier_scope(segment, qualifier)?;
                    qualifier = LookupQualifier::Scope(scope);
                }
                let (text, target, template_arguments) = self.simple_parts(last);
                Some(NameParts {
                    text,
                    target,
                    qualifier,
                    template_arguments,
                })
            }
            _ => {
                let (text, target, template_arguments) = self.simple_parts(name);
                Some(NameParts {
                    text,
                    target,
                    qualifier: LookupQualifier::Unqualified,
                    template_arguments,
                })
            }
        }
    }

    /// The namespace or class scope named by one qualifier segment
    fn qualifier_scope(&mut self, segment: NodeId, qualifier: LookupQualifier) -> Option<FileScopeId> {
        let (text, target, _) = self.simple_parts(segment);
        let lookup = self.model.lookup(self.scope, Namespace::Ordinary, text, qualifier);
        let found = lookup.visible().iter().find_map(|&id| {
            match &self.model.binding(id).kind {
                BindingKind::Namespace { scope } => Some((id, *scope)),
                _ => composite_members_of(&self.model, id).map(|scope| (id, scope)),
            }
        });
        match found {
            Some((id, scope)) => {
                self.model.set_resolution(target, id);
                Some(scope)
            }
            None => {
                self.record_problem(
                    target,
                    ProblemBinding::new(UseSite::TypeName.unresolved(), text)
                        .with_candidates(lookup.visible().iter().copied()),
                );
                None
            }
        }
    }

    /// Visible bindings for a name, falling back to the cross-file index for
    /// file-level names this unit does not declare
    fn candidates(&mut self, text: &str, namespace: Namespace, qualifier: LookupQualifier) -> Vec<BindingId> {
        let visible = self
            .model
            .lookup(self.scope, namespace, text, qualifier)
            .visible()
            .to_vec();
        if !visible.is_empty() || matches!(qualifier, LookupQualifier::Scope(_)) {
            return visible;
        }
        self.imported(text, namespace)
    }

    fn imported(&mut self, text: &str, namespace: Namespace) -> Vec<BindingId> {
        let Some(index) = self.index else {
            return Vec::new();
        };
        let cache_key = match namespace {
            Namespace::Tag => SmolStr::from(format!("tag {text}")),
            Namespace::Ordinary | Namespace::Label => SmolStr::from(text),
        };
        if let Some(ids) = self.model.imported(&cache_key) {
            return ids.to_vec();
        }
        let key = BindingKey::new(namespace, text);
        let mut entries = index.find_definitions(&key);
        entries.extend(index.find_declarations(&key));
        let mut ids: Vec<BindingId> = Vec::new();
        let global = self.model.global_scope();
        for entry in entries {
            let duplicate = ids
                .iter()
                .any(|&id| self.model.binding(id).ty == entry.ty && self.model.binding(id).name == entry.name);
            if !duplicate {
                ids.push(self.model.add_binding(entry.to_binding(global)));
            }
        }
        tracing::trace!(name = text, found = ids.len(), "cross-file lookup");
        self.model.add_imported(cache_key, ids.clone());
        ids
    }

    /// Looks up and resolves a name use, recording the outcome on its node
    fn resolve_name(
        &mut self,
        name: NodeId,
        site: UseSite,
        namespace: Namespace,
        arguments: Option<&[Argument]>,
    ) -> Option<(BindingId, Substitution)> {
        if let Some(existing) = self.model.resolution(self.ast.last_segment(name)) {
            return (!self.model.binding(existing).kind.is_problem()).then(Vec::new).map(|s| (existing, s));
        }
        let parts = self.analyze_name(name)?;
        let template_arguments: Option<Vec<Type>> = parts
            .template_arguments
            .map(|arguments| arguments.iter().map(|&a| self.template_argument(a)).collect());
        let candidates = self.candidates(parts.text, namespace, parts.qualifier);

        // `T(args)` with `T` a type is a functional cast or temporary
        let names_types = !candidates.is_empty()
            && candidates
                .iter()
                .all(|&id| self.model.binding(id).kind.is_type());
        let (site, arguments) = if site == UseSite::FunctionCall && names_types {
            (UseSite::TypeName, None)
        } else {
            (site, arguments)
        };

        let resolver = Resolver::new(&self.model, &self.visiting);
        let mut request = Request::new(site, parts.text, &candidates)
            .with_template_arguments(template_arguments.as_deref());
        if let Some(arguments) = arguments {
            request = request.with_arguments(arguments);
        }
        let resolved = resolver.resolve(&request);
        self.record(parts.target, resolved)
    }

    fn template_argument(&mut self, argument: NodeId) -> Type {
        match self.ast.kind(argument) {
            NodeKind::TypeId(_) => self.type_id(argument),
            NodeKind::Expression(_) => {
                self.expression(argument);
                Type::Unknown
            }
            _ => Type::Unknown,
        }
    }

    /// The type an expression naming `binding` has
    fn value_type(&self, binding: BindingId, substitution: &[(SmolStr, Type)]) -> Type {
        let binding = self.model.binding(binding);
        match &binding.kind {
            BindingKind::Template(_) => binding.ty.substitute(substitution),
            BindingKind::Problem(_)
            | BindingKind::Macro { .. }
            | BindingKind::Label
            | BindingKind::Namespace { .. } => Type::Unknown,
            _ => binding.ty.clone(),
        }
    }

    // ---------------------------------------------------------------------
    // Declarations
    // ---------------------------------------------------------------------

    fn declaration(&mut self, declaration: NodeId) {
        let ast = self.ast;
        match ast.declaration(declaration) {
            Some(Declaration::Simple {
                decl_spec,
                declarators,
            }) => {
                let base = self.decl_specifier(*decl_spec);
                let spec = ast.decl_specifier(*decl_spec).cloned().unwrap_or_default();
                for &declarator in declarators {
                    self.init_declarator(declaration, &spec, &base, declarator);
                }
            }
            Some(Declaration::FunctionDefinition {
                decl_spec,
                declarator,
                body,
            }) => {
                let owner = self.function_declaration(declaration, *decl_spec, *declarator);
                self.function_body(declaration, *declarator, *body, owner);
            }
            Some(Declaration::Namespace { name, declarations }) => {
                self.namespace(declaration, *name, declarations);
            }
            Some(Declaration::UsingDirective { name }) => self.using_directive(*name),
            Some(Declaration::Template {
                parameters,
                declaration: templated,
            }) => self.template(declaration, parameters, *templated),
            Some(Declaration::Problem { .. }) | None => {}
        }
    }

    /// Declares a named entity in the current declaration scope, or attaches
    /// an out-of-class definition to the member it names.
    fn declare_entity(
        &mut self,
        name: NodeId,
        kind: BindingKind,
        ty: Type,
        declaration: NodeId,
        is_definition: bool,
        namespace: Namespace,
    ) -> Option<BindingId> {
        let ast = self.ast;
        if matches!(ast.name(name).map(|n| &n.kind), Some(NameKind::Qualified { .. })) {
            return self.member_definition(name, &ty, declaration, is_definition);
        }
        let (text, target, _) = self.simple_parts(name);
        let scope = self.declaration_scope();
        let mut binding = Binding::new(text.into(), self.qualify(scope, text), kind, scope, ty)
            .declared_at(declaration);
        if is_definition {
            binding = binding.defined_at(declaration);
        }
        let declared = self.model.declare(scope, namespace, binding);
        self.record_declared(target, text, declared)
    }

    /// `void S::f() {}` or `int S::count = 0;`
    fn member_definition(&mut self, name: NodeId, ty: &Type, declaration: NodeId, is_definition: bool) -> Option<BindingId> {
        let parts = self.analyze_name(name)?;
        let candidates = self
            .model
            .lookup(self.scope, Namespace::Ordinary, parts.text, parts.qualifier)
            .visible()
            .to_vec();
        let matching = candidates.iter().copied().find(|&id| {
            let member = self.model.binding(id);
            match (member.ty.as_function(), ty.as_function()) {
                (Some(declared), Some(defined)) => {
                    member.kind.is_callable_entity() && declared.same_parameters(defined)
                }
                (None, None) => matches!(member.kind, BindingKind::Variable(_)),
                _ => false,
            }
        });
        let Some(id) = matching else {
            self.record_problem(
                parts.target,
                ProblemBinding::new(UseSite::MemberDefinition.unresolved(), parts.text)
                    .with_candidates(candidates),
            );
            return None;
        };
        if is_definition && self.model.binding(id).definition.is_some() {
            self.record_problem(
                parts.target,
                ProblemBinding::new(ProblemKind::Redeclaration, parts.text)
                    .with_candidates([id]),
            );
            return None;
        }
        let member = self.model.binding_mut(id);
        member.declarations.push(declaration);
        if is_definition {
            member.definition = Some(declaration);
        }
        self.model.set_resolution(parts.target, id);
        Some(id)
    }

    fn entity_kind(&mut self, spec: &DeclSpecifier, ty: &Type, declarator: NodeId, initialized: bool) -> BindingKind {
        let scope_kind = self.model.scopes().scope(self.declaration_scope()).kind;
        let kind = if spec.storage == StorageClass::Typedef {
            BindingKind::Type(TypeBinding::Typedef)
        } else if matches!(ty.unqualified(), Type::Function(_)) {
            BindingKind::Function(FunctionBinding {
                default_arguments: self.default_arguments(declarator),
                is_method: scope_kind == ScopeKind::Class,
                is_constructor: self.is_constructor(declarator),
            })
        } else {
            let role = match scope_kind {
                ScopeKind::Global | ScopeKind::Namespace | ScopeKind::Template => VariableRole::Global,
                ScopeKind::Class => VariableRole::Field,
                ScopeKind::Function | ScopeKind::Block if spec.storage == StorageClass::Extern => {
                    VariableRole::Global
                }
                ScopeKind::Function | ScopeKind::Block => VariableRole::Local,
            };
            BindingKind::Variable(VariableBinding {
                storage: spec.storage,
                role,
                initialized,
            })
        };
        match self.pending_template.take() {
            Some((parameters, defaults)) => BindingKind::Template(TemplateBinding {
                parameters,
                defaults,
                entity: Box::new(kind),
            }),
            None => kind,
        }
    }

    /// The class whose member scope is current, by simple name
    fn enclosing_class_name(&self) -> Option<&str> {
        let scope = self.model.scopes().scope(self.declaration_scope());
        (scope.kind == ScopeKind::Class)
            .then(|| scope.qualified_name.rsplit("::").next().unwrap_or_default())
    }

    fn is_constructor(&self, declarator: NodeId) -> bool {
        let name = self.ast.name_text(self.ast.declarator_name(declarator));
        self.enclosing_class_name().is_some_and(|class| class == name)
    }

    /// The function declarator closest to the declared name
    fn function_declarator(&self, declarator: NodeId) -> Option<NodeId> {
        let ast = self.ast;
        let mut current = Some(declarator);
        let mut found = None;
        while let Some(id) = current {
            let Some(decl) = ast.declarator(id) else {
                break;
            };
            if matches!(decl.kind, DeclaratorKind::Function { .. }) {
                found = Some(id);
            }
            current = decl.nested;
        }
        found
    }

    fn function_parameters(&self, declarator: NodeId) -> &'a [NodeId] {
        let ast = self.ast;
        let Some(decl) = self.function_declarator(declarator).and_then(|id| ast.declarator(id)) else {
            return &[];
        };
        match &decl.kind {
            DeclaratorKind::Function { parameters, .. } => parameters.as_slice(),
            _ => &[],
        }
    }

    fn default_arguments(&self, declarator: NodeId) -> usize {
        let ast = self.ast;
        self.function_parameters(declarator)
            .iter()
            .rev()
            .take_while(|&&p| match ast.kind(p) {
                NodeKind::ParameterDeclaration(param) => self.initializer_of(param.declarator).is_some(),
                _ => false,
            })
            .count()
    }

    /// The initializer attached to a declarator or any declarator it nests
    fn initializer_of(&self, declarator: NodeId) -> Option<NodeId> {
        let ast = self.ast;
        let mut current = Some(declarator);
        while let Some(id) = current {
            let decl = ast.declarator(id)?;
            if decl.initializer.is_some() {
                return decl.initializer;
            }
            current = decl.nested;
        }
        None
    }

    /// Declared type, with constructors returning nothing
    fn entity_type(&mut self, declarator: NodeId, base: Type) -> Type {
        let ty = self.declarator_type(declarator, base);
        if !self.is_constructor(declarator) {
            return ty;
        }
        match ty.as_function() {
            Some(function) => Type::function(Type::Void, function.parameters.clone(), function.var_args),
            None => ty,
        }
    }

    fn init_declarator(&mut self, declaration: NodeId, spec: &DeclSpecifier, base: &Type, declarator: NodeId) {
        let ast = self.ast;
        let ty = self.entity_type(declarator, base.clone());
        let name = ast.declarator_name(declarator);
        let initializer = self.initializer_of(declarator);
        if let Some(width) = ast.declarator(declarator).and_then(|d| d.bit_width) {
            self.expression(width);
        }
        if ast.name(name).is_none_or(Name::is_empty) {
            if let Some(init) = initializer {
                self.initializer(init, &ty);
            }
            return;
        }

        let kind = self.entity_kind(spec, &ty, declarator, initializer.is_some());
        let is_definition = initializer.is_some() && !matches!(kind, BindingKind::Type(_));
        let Some(id) = self.declare_entity(name, kind, ty.clone(), declaration, is_definition, Namespace::Ordinary) else {
            if let Some(init) = initializer {
                self.initializer(init, &ty);
            }
            return;
        };

        let Some(init) = initializer else {
            return;
        };
        if ty.contains_auto() {
            self.visiting.insert(id);
            let value = self.initializer(init, &ty);
            self.visiting.remove(&id);
            let deduced = ty.replace_auto(&value.decay());
            self.model.binding_mut(id).ty = deduced;
        } else {
            self.initializer(init, &ty);
        }
    }

    /// Binds an initializer; returns the type of the initializing value
    fn initializer(&mut self, init: NodeId, declared: &Type) -> Type {
        let ast = self.ast;
        match ast.kind(init) {
            NodeKind::Initializer(Initializer::Expression(expr)) => self.expression(*expr),
            NodeKind::Initializer(Initializer::List(items)) => {
                for &item in items {
                    self.initializer(item, &Type::Unknown);
                }
                Type::Unknown
            }
            NodeKind::Initializer(Initializer::Constructor { argument }) => {
                self.constructor_call(init, *argument, declared);
                declared.clone()
            }
            NodeKind::Expression(_) => self.expression(init),
            _ => Type::Unknown,
        }
    }

    /// `T x(args)`: picks the constructor of `T` for the arguments
    fn constructor_call(&mut self, init: NodeId, argument: Option<NodeId>, declared: &Type) {
        let arguments = self.arguments(argument);
        let Some(class) = declared.composite_name(false).cloned() else {
            return;
        };
        let Some(members) = self.model.composite_members(&class) else {
            return;
        };
        let simple = class.rsplit("::").next().unwrap_or_default();
        let constructors: Vec<BindingId> = self
            .model
            .lookup(members, Namespace::Ordinary, simple, LookupQualifier::Scope(members))
            .visible()
            .iter()
            .copied()
            .filter(|&id| {
                matches!(&self.model.binding(id).kind, BindingKind::Function(f) if f.is_constructor)
            })
            .collect();

        if constructors.is_empty() {
            // Implicit default and copy constructors
            let copies = arguments.len() == 1
                && arguments[0].ty.composite_name(false) == Some(&class);
            if !arguments.is_empty() && !copies && !arguments.iter().any(|a| a.ty.is_unknown()) {
                self.record_problem(
                    init,
                    ProblemBinding::new(ProblemKind::InvalidArguments, simple),
                );
            }
            return;
        }
        let resolver = Resolver::new(&self.model, &self.visiting);
        let resolved = resolver.resolve(
            &Request::new(UseSite::FunctionCall, simple, &constructors).with_arguments(&arguments),
        );
        self.record(init, resolved);
    }

    /// Declares the function named by a definition; returns the scope its
    /// body is nested in
    fn function_declaration(&mut self, definition: NodeId, decl_spec: NodeId, declarator: NodeId) -> FileScopeId {
        let ast = self.ast;
        let base = self.decl_specifier(decl_spec);
        let spec = ast.decl_specifier(decl_spec).cloned().unwrap_or_default();
        let ty = self.entity_type(declarator, base);
        let name = ast.declarator_name(declarator);
        let kind = self.entity_kind(&spec, &ty, declarator, true);
        let id = self.declare_entity(name, kind, ty, definition, true, Namespace::Ordinary);
        id.map_or_else(|| self.declaration_scope(), |id| self.model.binding(id).scope)
    }

    fn function_body(&mut self, definition: NodeId, declarator: NodeId, body: NodeId, owner: FileScopeId) {
        let _span = tracing::trace_span!("function_body", name = self.ast.name_text(self.ast.declarator_name(declarator))).entered();
        let prefix = self.model.scopes().scope(owner).qualified_name.clone();
        let function_scope = self
            .model
            .open_scope(owner, ScopeKind::Function, Some(definition), prefix);
        let saved = mem::replace(&mut self.scope, function_scope);

        for &parameter in self.function_parameters(declarator) {
            self.declare_parameter(parameter);
        }
        self.collect_labels(body, function_scope);

        // The outermost block shares the function scope with the parameters
        match self.ast.statement(body) {
            Some(Statement::Compound { statements }) => {
                for &statement in statements {
                    self.statement(statement);
                }
            }
            _ => self.statement(body),
        }
        self.scope = saved;
    }

    fn declare_parameter(&mut self, parameter: NodeId) {
        let ast = self.ast;
        let NodeKind::ParameterDeclaration(param) = ast.kind(parameter) else {
            return;
        };
        let base = self.decl_specifier(param.decl_spec);
        let ty = self.declarator_type(param.declarator, base).adjusted_parameter();
        let name = ast.declarator_name(param.declarator);
        if ast.name(name).is_none_or(Name::is_empty) {
            return;
        }
        let storage = ast
            .decl_specifier(param.decl_spec)
            .map_or(StorageClass::Unspecified, |spec| spec.storage);
        let kind = BindingKind::Variable(VariableBinding {
            storage,
            role: VariableRole::Parameter,
            initialized: false,
        });
        self.declare_entity(name, kind, ty, parameter, false, Namespace::Ordinary);
    }

    /// Labels are visible throughout their function, before and after the label
    fn collect_labels(&mut self, body: NodeId, function_scope: FileScopeId) {
        let ast = self.ast;
        for node in ast.preorder(body) {
            let Some(Statement::Labeled { label, .. }) = ast.statement(node) else {
                continue;
            };
            let text = ast.name_text(*label);
            let binding = Binding::new(text.into(), text.into(), BindingKind::Label, function_scope, Type::Unknown)
                .declared_at(node)
                .defined_at(node);
            let declared = self.model.declare(function_scope, Namespace::Label, binding);
            self.record_declared(*label, text, declared);
        }
    }

    fn namespace(&mut self, declaration: NodeId, name: NodeId, declarations: &[NodeId]) {
        let ast = self.ast;
        let text = ast.name_text(name);
        let parent = self.declaration_scope();
        let scope = if text.is_empty() {
            let prefix = self.model.scopes().scope(parent).qualified_name.clone();
            let scope = self
                .model
                .open_scope(parent, ScopeKind::Namespace, Some(declaration), prefix);
            self.model.add_using_directive(parent, scope);
            scope
        } else {
            let existing = self
                .model
                .scopes()
                .table(parent)
                .get(Namespace::Ordinary, text)
                .iter()
                .find_map(|&id| match self.model.binding(id).kind {
                    BindingKind::Namespace { scope } => Some((id, scope)),
                    _ => None,
                });
            match existing {
                Some((id, scope)) => {
                    self.model.set_resolution(name, id);
                    scope
                }
                None => {
                    let qualified = self.qualify(parent, text);
                    let scope = self.model.open_scope(
                        parent,
                        ScopeKind::Namespace,
                        Some(declaration),
                        qualified.clone(),
                    );
                    let binding = Binding::new(text.into(), qualified, BindingKind::Namespace { scope }, parent, Type::Unknown)
                        .declared_at(declaration)
                        .defined_at(declaration);
                    let declared = self.model.declare(parent, Namespace::Ordinary, binding);
                    self.record_declared(name, text, declared);
                    scope
                }
            }
        };
        let saved = mem::replace(&mut self.scope, scope);
        for &declaration in declarations {
            self.declaration(declaration);
        }
        self.scope = saved;
    }

    fn using_directive(&mut self, name: NodeId) {
        let Some((id, _)) = self.resolve_name(name, UseSite::Identifier, Namespace::Ordinary, None) else {
            return;
        };
        if let BindingKind::Namespace { scope } = self.model.binding(id).kind {
            self.model.add_using_directive(self.scope, scope);
        }
    }

    fn template(&mut self, declaration: NodeId, parameters: &[NodeId], templated: NodeId) {
        let ast = self.ast;
        let saved = self.enter_scope(ScopeKind::Template, declaration);
        let template_scope = self.scope;
        let mut names = Vec::new();
        let mut defaults = 0;
        for &parameter in parameters {
            let NodeKind::TemplateParameter(param) = ast.kind(parameter) else {
                continue;
            };
            if let Some(default) = param.default {
                self.type_id(default);
                defaults += 1;
            }
            let text = ast.name_text(param.name);
            names.push(SmolStr::from(text));
            if text.is_empty() {
                continue;
            }
            let binding = Binding::new(
                text.into(),
                text.into(),
                BindingKind::Type(TypeBinding::TemplateParameter),
                template_scope,
                Type::Dependent(text.into()),
            )
            .declared_at(parameter);
            let declared = self.model.declare(template_scope, Namespace::Ordinary, binding);
            self.record_declared(param.name, text, declared);
        }
        self.pending_template = Some((names, defaults));
        self.declaration(templated);
        self.pending_template = None;
        self.scope = saved;
    }

    // ---------------------------------------------------------------------
    // Types
    // ---------------------------------------------------------------------

    fn decl_specifier(&mut self, spec_id: NodeId) -> Type {
        if let Some(ty) = self.spec_types.get(&spec_id) {
            return ty.clone();
        }
        let ast = self.ast;
        let Some(spec) = ast.decl_specifier(spec_id) else {
            return Type::Unknown;
        };
        let base = match spec.type_specifier {
            Some(specifier) => self.type_specifier(specifier),
            None => simple_type(spec.simple, spec.modifiers),
        };
        let ty = base.qualified(spec.qualifiers);
        self.spec_types.insert(spec_id, ty.clone());
        ty
    }

    fn type_specifier(&mut self, specifier: NodeId) -> Type {
        let ast = self.ast;
        match ast.kind(specifier) {
            NodeKind::CompositeSpecifier(spec) => self.composite_specifier(specifier, spec),
            NodeKind::ElaboratedSpecifier(spec) => self.elaborated_specifier(specifier, spec),
            NodeKind::EnumerationSpecifier(spec) => self.enumeration_specifier(specifier, spec),
            NodeKind::NamedTypeSpecifier(spec) => self.named_type(spec.name),
            _ => Type::Unknown,
        }
    }

    fn named_type(&mut self, name: NodeId) -> Type {
        match self.resolve_name(name, UseSite::TypeName, Namespace::Ordinary, None) {
            Some((id, _)) => self.model.binding(id).ty.clone(),
            None => Type::Unknown,
        }
    }

    fn anonymous_name(&self, node: NodeId) -> SmolStr {
        SmolStr::from(format!("{{anonymous@{}}}", self.ast.span(node).start))
    }

    fn composite_specifier(&mut self, specifier: NodeId, spec: &'a CompositeSpecifier) -> Type {
        let template = self.pending_template.take();
        let (text, target, _) = self.simple_parts(self.ast.last_segment(spec.name));
        let scope = self.declaration_scope();
        let qualified = if text.is_empty() {
            self.anonymous_name(specifier)
        } else {
            self.qualify(scope, text)
        };
        let ty = Type::Composite {
            key: spec.key,
            name: qualified.clone(),
        };
        let members = self
            .model
            .open_scope(self.scope, ScopeKind::Class, Some(specifier), qualified.clone());
        let composite = BindingKind::Type(TypeBinding::Composite {
            key: spec.key,
            members: Some(members),
        });
        let kind = match template {
            Some((parameters, defaults)) => BindingKind::Template(TemplateBinding {
                parameters,
                defaults,
                entity: Box::new(composite),
            }),
            None => composite,
        };
        let binding = Binding::new(text.into(), qualified.clone(), kind, scope, ty.clone())
            .declared_at(specifier)
            .defined_at(specifier);
        let id = if text.is_empty() {
            Some(self.model.add_binding(binding))
        } else {
            let declared = self.model.declare(scope, Namespace::Tag, binding);
            self.record_declared(target, text, declared)
        };
        if let Some(id) = id {
            self.model.register_composite(qualified, id);
        }

        let saved = mem::replace(&mut self.scope, members);
        let mut bodies = Vec::new();
        for &member in &spec.members {
            match self.ast.declaration(member) {
                Some(Declaration::FunctionDefinition {
                    decl_spec,
                    declarator,
                    body,
                }) => {
                    let owner = self.function_declaration(member, *decl_spec, *declarator);
                    bodies.push((member, *declarator, *body, owner));
                }
                Some(_) => self.declaration(member),
                None => {}
            }
        }
        for (definition, declarator, body, owner) in bodies {
            self.function_body(definition, declarator, body, owner);
        }
        self.scope = saved;
        ty
    }

    fn elaborated_specifier(&mut self, specifier: NodeId, spec: &ElaboratedSpecifier) -> Type {
        let ast = self.ast;
        let is_plain = matches!(
            ast.name(spec.name).map(|n| &n.kind),
            Some(NameKind::Identifier)
        );
        if let (ElaboratedKey::Composite(key), true) = (spec.key, is_plain) {
            let text = ast.name_text(spec.name);
            if self.candidates(text, Namespace::Tag, LookupQualifier::Unqualified).is_empty() {
                // `struct S` with no visible S declares an incomplete type
                let scope = self.declaration_scope();
                let qualified = self.qualify(scope, text);
                let ty = Type::Composite {
                    key,
                    name: qualified.clone(),
                };
                let binding = Binding::new(
                    text.into(),
                    qualified,
                    BindingKind::Type(TypeBinding::Composite { key, members: None }),
                    scope,
                    ty.clone(),
                )
                .declared_at(specifier);
                let declared = self.model.declare(scope, Namespace::Tag, binding);
                self.record_declared(spec.name, text, declared);
                return ty;
            }
        }
        match self.resolve_name(spec.name, UseSite::TypeName, Namespace::Tag, None) {
            Some((id, _)) => self.model.binding(id).ty.clone(),
            None => Type::Unknown,
        }
    }

    fn enumeration_specifier(&mut self, specifier: NodeId, spec: &EnumerationSpecifier) -> Type {
        let ast = self.ast;
        let text = ast.name_text(spec.name);
        let scope = self.declaration_scope();
        let qualified = if text.is_empty() {
            self.anonymous_name(specifier)
        } else {
            self.qualify(scope, text)
        };
        let ty = Type::Enumeration {
            name: qualified.clone(),
        };
        let enumeration = if text.is_empty() {
            None
        } else {
            let binding = Binding::new(
                text.into(),
                qualified,
                BindingKind::Type(TypeBinding::Enumeration {
                    enumerators: Vec::new(),
                    defined: true,
                }),
                scope,
                ty.clone(),
            )
            .declared_at(specifier)
            .defined_at(specifier);
            let declared = self.model.declare(scope, Namespace::Tag, binding);
            self.record_declared(spec.name, text, declared)
        };

        let value_type = match self.language() {
            Language::C => Type::INT,
            Language::Cpp => ty.clone(),
        };
        let mut next = 0_i64;
        let mut enumerators = Vec::new();
        for &node in &spec.enumerators {
            let NodeKind::Enumerator(enumerator) = ast.kind(node) else {
                continue;
            };
            let value = match enumerator.value {
                Some(expr) => {
                    self.expression(expr);
                    const_eval::evaluate(ast, &self.model, expr)
                }
                None => Some(next),
            };
            next = value.unwrap_or(next).saturating_add(1);
            let name = ast.name_text(enumerator.name);
            let binding = Binding::new(
                name.into(),
                self.qualify(scope, name),
                BindingKind::Enumerator { enumeration, value },
                scope,
                value_type.clone(),
            )
            .declared_at(node)
            .defined_at(node);
            let declared = self.model.declare(scope, Namespace::Ordinary, binding);
            if let Some(id) = self.record_declared(enumerator.name, name, declared) {
                enumerators.push(id);
            }
        }
        if let Some(id) = enumeration {
            if let BindingKind::Type(TypeBinding::Enumeration {
                enumerators: list, ..
            }) = &mut self.model.binding_mut(id).kind
            {
                *list = enumerators;
            }
        }
        ty
    }

    /// Applies pointer operators, then array and function suffixes, then
    /// recurses into the nested declarator
    fn declarator_type(&mut self, declarator: NodeId, base: Type) -> Type {
        let ast = self.ast;
        let Some(decl) = ast.declarator(declarator) else {
            return base;
        };
        let mut ty = base;
        for &op in &decl.pointer_ops {
            if let NodeKind::PointerOperator(pointer) = ast.kind(op) {
                ty = match pointer.kind {
                    PointerKind::Pointer => Type::pointer_to(ty),
                    PointerKind::Reference => Type::reference_to(ty),
                }
                .qualified(pointer.qualifiers);
            }
        }
        match &decl.kind {
            DeclaratorKind::Plain => {}
            DeclaratorKind::Array { modifiers } => {
                for &modifier in modifiers.iter().rev() {
                    let size = match ast.kind(modifier) {
                        NodeKind::ArrayModifier(ArrayModifier { size: Some(expr) }) => {
                            self.expression(*expr);
                            const_eval::evaluate(ast, &self.model, *expr)
                                .and_then(|v| u64::try_from(v).ok())
                        }
                        _ => None,
                    };
                    ty = Type::Array {
                        element: Box::new(ty),
                        size,
                    };
                }
            }
            DeclaratorKind::Function {
                parameters,
                var_args,
            } => {
                let parameters = self.parameter_types(parameters);
                ty = Type::function(ty, parameters, *var_args);
            }
        }
        match decl.nested {
            Some(nested) => self.declarator_type(nested, ty),
            None => ty,
        }
    }

    fn parameter_types(&mut self, parameters: &[NodeId]) -> Vec<Type> {
        let ast = self.ast;
        let mut types = Vec::with_capacity(parameters.len());
        let mut unnamed_void = false;
        for &parameter in parameters {
            let NodeKind::ParameterDeclaration(param) = ast.kind(parameter) else {
                continue;
            };
            let base = self.decl_specifier(param.decl_spec);
            let ty = self.declarator_type(param.declarator, base);
            if let Some(default) = self.initializer_of(param.declarator) {
                self.initializer(default, &ty);
            }
            unnamed_void = ty == Type::Void
                && ast
                    .name(ast.declarator_name(param.declarator))
                    .is_none_or(Name::is_empty);
            types.push(ty.adjusted_parameter());
        }
        // `f(void)` takes no parameters
        if types.len() == 1 && unnamed_void {
            types.clear();
        }
        types
    }

    fn type_id(&mut self, node: NodeId) -> Type {
        let ast = self.ast;
        let NodeKind::TypeId(type_id) = ast.kind(node) else {
            return Type::Unknown;
        };
        let base = self.decl_specifier(type_id.decl_spec);
        match type_id.declarator {
            Some(declarator) => self.declarator_type(declarator, base),
            None => base,
        }
    }

    // ---------------------------------------------------------------------
    // Statements
    // ---------------------------------------------------------------------

    fn statement(&mut self, statement: NodeId) {
        let ast = self.ast;
        let Some(stmt) = ast.statement(statement) else {
            return;
        };
        match stmt {
            Statement::Compound { statements } => {
                let saved = self.enter_scope(ScopeKind::Block, statement);
                for &inner in statements {
                    self.statement(inner);
                }
                self.scope = saved;
            }
            Statement::Expression { expression } | Statement::Case { expression } => {
                self.expression(*expression);
            }
            Statement::Declaration { declaration } => self.declaration(*declaration),
            Statement::Labeled { body, .. } => self.statement(*body),
            Statement::If {
                condition,
                then_clause,
                else_clause,
            } => {
                self.expression(*condition);
                self.statement(*then_clause);
                if let Some(else_clause) = else_clause {
                    self.statement(*else_clause);
                }
            }
            Statement::While { condition, body } => {
                self.expression(*condition);
                self.statement(*body);
            }
            Statement::Do { body, condition } => {
                self.statement(*body);
                self.expression(*condition);
            }
            Statement::For {
                initializer,
                condition,
                iteration,
                body,
            } => {
                let saved = self.enter_scope(ScopeKind::Block, statement);
                self.statement(*initializer);
                if let Some(condition) = condition {
                    self.expression(*condition);
                }
                if let Some(iteration) = iteration {
                    self.expression(*iteration);
                }
                self.statement(*body);
                self.scope = saved;
            }
            Statement::Switch { controller, body } => {
                self.expression(*controller);
                self.statement(*body);
            }
            Statement::Goto { label } => self.goto(*label),
            Statement::Return { value } => {
                if let Some(value) = value {
                    self.expression(*value);
                }
            }
            Statement::Null
            | Statement::Default
            | Statement::Continue
            | Statement::Break
            | Statement::Problem { .. } => {}
        }
    }

    fn goto(&mut self, label: NodeId) {
        let text = self.ast.name_text(label);
        let candidates = self
            .model
            .scopes()
            .enclosing(self.scope, ScopeKind::Function)
            .map(|function| {
                self.model
                    .lookup(function, Namespace::Label, text, LookupQualifier::Scope(function))
                    .visible()
                    .to_vec()
            })
            .unwrap_or_default();
        let resolver = Resolver::new(&self.model, &self.visiting);
        let resolved = resolver.resolve(&Request::new(UseSite::LabelReference, text, &candidates));
        self.record(label, resolved);
    }

    // ---------------------------------------------------------------------
    // Expressions
    // ---------------------------------------------------------------------

    fn expression(&mut self, expr: NodeId) -> Type {
        if let Some(ty) = self.model.expression_type(expr) {
            return ty.clone();
        }
        let ty = self.compute_expression(expr);
        self.model.set_expression_type(expr, ty.clone());
        ty
    }

    fn compute_expression(&mut self, expr: NodeId) -> Type {
        let ast = self.ast;
        let Some(expression) = ast.expression(expr) else {
            return match ast.kind(expr) {
                NodeKind::Initializer(_) => self.initializer(expr, &Type::Unknown),
                NodeKind::TypeId(_) => self.type_id(expr),
                _ => Type::Unknown,
            };
        };
        match expression {
            Expression::Literal(literal) => self.literal(expr, literal),
            Expression::Id { name } => {
                match self.resolve_name(*name, UseSite::Identifier, Namespace::Ordinary, None) {
                    Some((id, substitution)) => self.value_type(id, &substitution),
                    None => Type::Unknown,
                }
            }
            Expression::Unary { op, operand } => {
                let ty = self.expression(*operand);
                self.unary_type(*op, &ty)
            }
            Expression::Binary { op, lhs, rhs } => {
                let lhs = self.expression(*lhs);
                let rhs = self.expression(*rhs);
                self.binary_type(*op, &lhs, &rhs)
            }
            Expression::Conditional {
                condition,
                positive,
                negative,
            } => {
                self.expression(*condition);
                let positive = self.expression(*positive);
                let negative = self.expression(*negative);
                if positive.is_unknown() {
                    negative
                } else {
                    positive
                }
            }
            Expression::List { expressions } => {
                let mut last = Type::Unknown;
                for &inner in expressions {
                    last = self.expression(inner);
                }
                last
            }
            Expression::ArraySubscript { array, subscript } => {
                let array = self.expression(*array);
                self.expression(*subscript);
                array.pointee().cloned().unwrap_or(Type::Unknown)
            }
            Expression::FunctionCall { callee, argument } => self.call(*callee, *argument),
            Expression::FieldReference {
                owner,
                field,
                is_pointer,
            } => self.field_reference(*owner, *field, *is_pointer, None),
            Expression::Cast { type_id, operand } => {
                self.expression(*operand);
                self.type_id(*type_id)
            }
            Expression::TypeIdOperation { type_id, .. } => {
                self.type_id(*type_id);
                Type::Integer(IntegerKind::UnsignedLong)
            }
            Expression::Problem { .. } => Type::Unknown,
        }
    }

    fn literal(&mut self, expr: NodeId, literal: &Literal) -> Type {
        if let Some(suffix) = &literal.suffix {
            return self.literal_operator(expr, literal.kind, suffix);
        }
        match literal.kind {
            LiteralKind::Integer => integer_literal_type(&literal.value),
            LiteralKind::Float => float_literal_type(&literal.value),
            LiteralKind::Char => match self.language() {
                Language::C => Type::INT,
                Language::Cpp => Type::Integer(IntegerKind::Char),
            },
            LiteralKind::String => Type::Array {
                element: Box::new(Type::Integer(IntegerKind::Char).qualified(Qualifiers::CONST)),
                size: u64::try_from(literal.value.len().saturating_sub(1)).ok(),
            },
            LiteralKind::True | LiteralKind::False => Type::Integer(IntegerKind::Bool),
            LiteralKind::Nullptr => Type::Nullptr,
            LiteralKind::This => self.this_type(),
        }
    }

    fn this_type(&self) -> Type {
        let scopes = self.model.scopes();
        scopes
            .enclosing(self.scope, ScopeKind::Class)
            .and_then(|class| self.model.composite(&scopes.scope(class).qualified_name))
            .map_or(Type::Unknown, |id| Type::pointer_to(self.model.binding(id).ty.clone()))
    }

    /// `42_km` calls `operator""_km`
    fn literal_operator(&mut self, expr: NodeId, kind: LiteralKind, suffix: &str) -> Type {
        let name = format!("operator\"\"{suffix}");
        let candidates = self.candidates(&name, Namespace::Ordinary, LookupQualifier::Unqualified);
        let resolver = Resolver::new(&self.model, &self.visiting);
        let resolved = resolver.resolve(
            &Request::new(UseSite::UdlOperatorCall, &name, &candidates).with_literal(kind),
        );
        match self.record(expr, resolved) {
            Some((id, _)) => call_result(&self.model.binding(id).ty),
            None => Type::Unknown,
        }
    }

    fn arguments(&mut self, argument: Option<NodeId>) -> Vec<Argument> {
        let ast = self.ast;
        ast.call_arguments(argument)
            .into_iter()
            .map(|arg| Argument {
                ty: self.expression(arg),
                is_null_constant: is_null_constant(ast, arg),
            })
            .collect()
    }

    fn call(&mut self, callee: NodeId, argument: Option<NodeId>) -> Type {
        let ast = self.ast;
        let arguments = self.arguments(argument);
        let callee_type = match ast.expression(callee) {
            Some(Expression::Id { name }) => {
                match self.resolve_name(*name, UseSite::FunctionCall, Namespace::Ordinary, Some(&arguments)) {
                    Some((id, substitution)) => {
                        if self.model.binding(id).kind.is_type() {
                            // Functional cast: the value has the named type
                            let ty = self.model.binding(id).ty.clone();
                            self.model.set_expression_type(callee, ty.clone());
                            return ty;
                        }
                        self.value_type(id, &substitution)
                    }
                    None => Type::Unknown,
                }
            }
            Some(Expression::FieldReference {
                owner,
                field,
                is_pointer,
            }) => self.field_reference(*owner, *field, *is_pointer, Some(&arguments)),
            _ => return call_result(&self.expression(callee)),
        };
        self.model.set_expression_type(callee, callee_type.clone());
        call_result(&callee_type)
    }

    /// `owner.field` or `owner->field`; with `arguments`, the callee of a method call
    fn field_reference(&mut self, owner: NodeId, field: NodeId, is_pointer: bool, arguments: Option<&[Argument]>) -> Type {
        let owner_type = self.expression(owner);
        if owner_type.non_reference().unqualified().is_dependent() {
            return Type::Unknown;
        }
        let (text, target, _) = self.simple_parts(self.ast.last_segment(field));
        let candidates = owner_type
            .composite_name(is_pointer)
            .and_then(|name| self.model.composite_members(name))
            .map(|members| {
                self.model
                    .lookup(members, Namespace::Ordinary, text, LookupQualifier::Scope(members))
                    .visible()
                    .to_vec()
            })
            .unwrap_or_default();
        let site = if arguments.is_some() {
            UseSite::MethodCall
        } else {
            UseSite::FieldAccess
        };
        let resolver = Resolver::new(&self.model, &self.visiting);
        let mut request = Request::new(site, text, &candidates);
        if let Some(arguments) = arguments {
            request = request.with_arguments(arguments);
        }
        let resolved = resolver.resolve(&request);
        match self.record(target, resolved) {
            Some((id, substitution)) => self.value_type(id, &substitution),
            None => Type::Unknown,
        }
    }

    fn unary_type(&self, op: UnaryOp, operand: &Type) -> Type {
        match op {
            UnaryOp::Star => match operand.pointee() {
                Some(pointee) => pointee.clone(),
                None if operand.as_function().is_some() => operand.clone(),
                None => Type::Unknown,
            },
            UnaryOp::Amper => Type::pointer_to(operand.non_reference().clone()),
            UnaryOp::Not => self.boolean(),
            UnaryOp::Sizeof => Type::Integer(IntegerKind::UnsignedLong),
            UnaryOp::Plus | UnaryOp::Minus | UnaryOp::Tilde => promote(operand),
            UnaryOp::Bracketed
            | UnaryOp::PrefixIncr
            | UnaryOp::PrefixDecr
            | UnaryOp::PostfixIncr
            | UnaryOp::PostfixDecr => operand.clone(),
        }
    }

    fn binary_type(&self, op: BinaryOp, lhs: &Type, rhs: &Type) -> Type {
        if op.is_assignment() {
            return lhs.non_reference().clone();
        }
        if op.is_comparison() {
            return self.boolean();
        }
        match op {
            BinaryOp::ShiftLeft | BinaryOp::ShiftRight => promote(lhs),
            BinaryOp::Plus | BinaryOp::Minus if lhs.pointee().is_some() => {
                if op == BinaryOp::Minus && rhs.pointee().is_some() {
                    Type::Integer(IntegerKind::Long)
                } else {
                    lhs.decay()
                }
            }
            BinaryOp::Plus if rhs.pointee().is_some() => rhs.decay(),
            _ => usual_arithmetic(lhs, rhs),
        }
    }

    fn boolean(&self) -> Type {
        match self.language() {
            Language::C => Type::INT,
            Language::Cpp => Type::Integer(IntegerKind::Bool),
        }
    }
}

fn simple_type(simple: SimpleType, modifiers: TypeModifiers) -> Type {
    let unsigned = modifiers.contains(TypeModifiers::UNSIGNED);
    match simple {
        SimpleType::Void => Type::Void,
        SimpleType::Bool => Type::Integer(IntegerKind::Bool),
        SimpleType::Auto => Type::Auto,
        SimpleType::Float => Type::Floating(FloatKind::Float),
        SimpleType::Double if modifiers.contains(TypeModifiers::LONG) => {
            Type::Floating(FloatKind::LongDouble)
        }
        SimpleType::Double => Type::Floating(FloatKind::Double),
        SimpleType::Char if unsigned => Type::Integer(IntegerKind::UnsignedChar),
        SimpleType::Char if modifiers.contains(TypeModifiers::SIGNED) => {
            Type::Integer(IntegerKind::SignedChar)
        }
        SimpleType::Char => Type::Integer(IntegerKind::Char),
        SimpleType::Int | SimpleType::Unspecified => {
            let kind = if modifiers.contains(TypeModifiers::LONG_LONG) {
                if unsigned {
                    IntegerKind::UnsignedLongLong
                } else {
                    IntegerKind::LongLong
                }
            } else if modifiers.contains(TypeModifiers::LONG) {
                if unsigned {
                    IntegerKind::UnsignedLong
                } else {
                    IntegerKind::Long
                }
            } else if modifiers.contains(TypeModifiers::SHORT) {
                if unsigned {
                    IntegerKind::UnsignedShort
                } else {
                    IntegerKind::Short
                }
            } else if unsigned {
                IntegerKind::UnsignedInt
            } else {
                IntegerKind::Int
            };
            Type::Integer(kind)
        }
    }
}

fn integer_literal_type(value: &str) -> Type {
    let lower = value.to_ascii_lowercase();
    let suffix = lower.trim_start_matches(|c: char| c.is_ascii_hexdigit() || c == 'x' || c == '\'');
    let unsigned = suffix.contains('u');
    let kind = match (suffix.matches('l').count(), unsigned) {
        (0, false) => IntegerKind::Int,
        (0, true) => IntegerKind::UnsignedInt,
        (1, false) => IntegerKind::Long,
        (1, true) => IntegerKind::UnsignedLong,
        (_, false) => IntegerKind::LongLong,
        (_, true) => IntegerKind::UnsignedLongLong,
    };
    Type::Integer(kind)
}

fn float_literal_type(value: &str) -> Type {
    let is_hex = value.starts_with("0x") || value.starts_with("0X");
    match value.chars().last() {
        Some('f' | 'F') if !is_hex => Type::Floating(FloatKind::Float),
        Some('l' | 'L') => Type::Floating(FloatKind::LongDouble),
        _ => Type::Floating(FloatKind::Double),
    }
}

fn is_null_constant(ast: &Ast, expr: NodeId) -> bool {
    match ast.expression(expr) {
        Some(Expression::Literal(literal)) => match literal.kind {
            LiteralKind::Nullptr => true,
            LiteralKind::Integer => literal.suffix.is_none() && literal.value.trim_start_matches('0').is_empty(),
            _ => false,
        },
        _ => false,
    }
}

/// Return type of a call through a value of type `callee`
fn call_result(callee: &Type) -> Type {
    callee
        .as_function()
        .map_or(Type::Unknown, |function| function.return_type.clone())
}

/// Integral promotion
fn promote(ty: &Type) -> Type {
    match ty.non_reference().unqualified() {
        Type::Integer(kind) if kind.rank() < IntegerKind::Int.rank() => Type::INT,
        Type::Enumeration { .. } => Type::INT,
        other => other.clone(),
    }
}

fn usual_arithmetic(lhs: &Type, rhs: &Type) -> Type {
    if lhs.is_unknown() || rhs.is_unknown() {
        return Type::Unknown;
    }
    match (promote(lhs), promote(rhs)) {
        (Type::Floating(a), Type::Floating(b)) => Type::Floating(a.max(b)),
        (Type::Floating(a), _) | (_, Type::Floating(a)) => Type::Floating(a),
        (Type::Integer(a), Type::Integer(b)) => {
            let larger = if (a.rank(), a.is_unsigned()) >= (b.rank(), b.is_unsigned()) {
                a
            } else {
                b
            };
            Type::Integer(larger)
        }
        (lhs, _) => lhs,
    }
}
