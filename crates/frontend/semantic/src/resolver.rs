//! # Binding resolution
//!
//! Turns the candidate list produced by lookup into a single binding, or a
//! problem binding explaining why none could be chosen. The resolver only
//! reads the model; the binder records what it returns.

use cdom_parser::ast::LiteralKind;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use crate::binding::{BindingId, BindingKind, ProblemBinding, ProblemKind, TypeBinding};
use crate::conversions::{standard_conversion, Argument, Rank};
use crate::model::SemanticModel;
use crate::scope::{LookupQualifier, Namespace};
use crate::types::{FloatKind, FunctionType, IntegerKind, Type};

/// Deduced or explicit template arguments, by parameter name
pub type Substitution = Vec<(SmolStr, Type)>;

/// Where a name is used; decides which problem an empty lookup produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UseSite {
    Identifier,
    FieldAccess,
    MethodCall,
    FunctionCall,
    LabelReference,
    UdlOperatorCall,
    TypeName,
    MemberDefinition,
}

impl UseSite {
    pub const fn unresolved(self) -> ProblemKind {
        match self {
            Self::Identifier => ProblemKind::VariableResolutionFailure,
            Self::FieldAccess => ProblemKind::FieldResolutionFailure,
            Self::MethodCall => ProblemKind::MethodResolutionFailure,
            Self::FunctionCall | Self::UdlOperatorCall => ProblemKind::FunctionResolutionFailure,
            Self::LabelReference => ProblemKind::LabelNotFound,
            Self::TypeName => ProblemKind::TypeResolutionFailure,
            Self::MemberDefinition => ProblemKind::MemberNotFound,
        }
    }

    pub const fn is_call(self) -> bool {
        matches!(self, Self::FunctionCall | Self::MethodCall | Self::UdlOperatorCall)
    }
}

/// One resolution request
#[derive(Debug, Clone)]
pub struct Request<'a> {
    pub site: UseSite,
    pub name: &'a str,
    pub candidates: &'a [BindingId],
    /// Call arguments; `None` outside calls
    pub arguments: Option<&'a [Argument]>,
    /// Explicit `<...>` arguments on a template id
    pub template_arguments: Option<&'a [Type]>,
    /// Literal category for user-defined literal operators
    pub literal: Option<LiteralKind>,
}

impl<'a> Request<'a> {
    pub const fn new(site: UseSite, name: &'a str, candidates: &'a [BindingId]) -> Self {
        Self {
            site,
            name,
            candidates,
            arguments: None,
            template_arguments: None,
            literal: None,
        }
    }

    pub const fn with_arguments(mut self, arguments: &'a [Argument]) -> Self {
        self.arguments = Some(arguments);
        self
    }

    pub const fn with_template_arguments(mut self, arguments: Option<&'a [Type]>) -> Self {
        self.template_arguments = arguments;
        self
    }

    pub const fn with_literal(mut self, literal: LiteralKind) -> Self {
        self.literal = Some(literal);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Binding {
        binding: BindingId,
        substitution: Substitution,
    },
    Problem(ProblemBinding),
}

impl Resolved {
    fn binding(binding: BindingId) -> Self {
        Self::Binding {
            binding,
            substitution: Vec::new(),
        }
    }

    fn problem(kind: ProblemKind, name: &str, candidates: impl IntoIterator<Item = BindingId>) -> Self {
        Self::Problem(ProblemBinding::new(kind, name).with_candidates(candidates))
    }
}

/// Why a candidate was not viable for a call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    Arguments,
    TemplateDeduction,
}

#[derive(Debug, Clone)]
struct Viable {
    binding: BindingId,
    ranks: Vec<Rank>,
    is_template: bool,
    substitution: Substitution,
}

pub struct Resolver<'m> {
    model: &'m SemanticModel,
    /// Bindings whose type is being deduced by the current request
    visiting: &'m FxHashSet<BindingId>,
}

impl<'m> Resolver<'m> {
    pub const fn new(model: &'m SemanticModel, visiting: &'m FxHashSet<BindingId>) -> Self {
        Self { model, visiting }
    }

    pub fn resolve(&self, request: &Request<'_>) -> Resolved {
        let _span = tracing::trace_span!("resolve", name = request.name, site = ?request.site).entered();
        let candidates: Vec<BindingId> = request
            .candidates
            .iter()
            .copied()
            .filter(|&id| !self.model.binding(id).kind.is_problem())
            .collect();
        if candidates.is_empty() {
            return Resolved::problem(request.site.unresolved(), request.name, []);
        }

        let resolved = match (request.site, request.arguments) {
            (UseSite::TypeName, _) => self.resolve_type_name(request, &candidates),
            (UseSite::UdlOperatorCall, _) => self.resolve_literal_operator(request, &candidates),
            (_, Some(arguments)) => self.resolve_call(request, &candidates, arguments),
            (_, None) => self.resolve_reference(request, &candidates),
        };

        if let Resolved::Binding { binding, .. } = &resolved {
            if self.visiting.contains(binding) {
                return Resolved::problem(ProblemKind::CircularReference, request.name, [*binding]);
            }
        }
        resolved
    }

    fn resolve_reference(&self, request: &Request<'_>, candidates: &[BindingId]) -> Resolved {
        let first = candidates[0];
        if candidates.len() == 1 {
            return self.check_template_arguments(request, first);
        }
        let all_functions = candidates
            .iter()
            .all(|&id| self.model.binding(id).kind.is_callable_entity());
        if all_functions {
            // An overload set named outside a call refers to its first member
            return self.check_template_arguments(request, first);
        }
        Resolved::problem(
            ProblemKind::AmbiguousReference,
            request.name,
            candidates.iter().copied(),
        )
    }

    fn check_template_arguments(&self, request: &Request<'_>, binding: BindingId) -> Resolved {
        let Some(explicit) = request.template_arguments else {
            return Resolved::binding(binding);
        };
        match &self.model.binding(binding).kind {
            BindingKind::Template(template) if explicit.len() <= template.parameters.len() => {
                let required = template.parameters.len() - template.defaults;
                if explicit.len() < required && template.entity.is_type() {
                    return Resolved::problem(ProblemKind::InvalidTemplateArguments, request.name, [binding]);
                }
                Resolved::Binding {
                    binding,
                    substitution: template
                        .parameters
                        .iter()
                        .cloned()
                        .zip(explicit.iter().cloned())
                        .collect(),
                }
            }
            _ => Resolved::problem(ProblemKind::InvalidTemplateArguments, request.name, [binding]),
        }
    }

    fn resolve_type_name(&self, request: &Request<'_>, candidates: &[BindingId]) -> Resolved {
        let types: Vec<BindingId> = candidates
            .iter()
            .copied()
            .filter(|&id| self.model.binding(id).kind.is_type())
            .collect();
        match types.as_slice() {
            [] => Resolved::problem(ProblemKind::TypeResolutionFailure, request.name, candidates.iter().copied()),
            [single] => self.check_template_arguments(request, *single),
            _ => {
                // A struct tag and a typedef of the same name denote one type
                let first = types[0];
                let ty = &self.model.binding(first).ty;
                if types.iter().all(|&id| self.model.binding(id).ty == *ty) {
                    self.check_template_arguments(request, first)
                } else {
                    Resolved::problem(ProblemKind::AmbiguousReference, request.name, types)
                }
            }
        }
    }

    fn resolve_call(&self, request: &Request<'_>, candidates: &[BindingId], arguments: &[Argument]) -> Resolved {
        let mut viable = Vec::new();
        let mut rejections = Vec::new();
        for &candidate in candidates {
            match self.viability(candidate, arguments, request.template_arguments) {
                Ok(v) => viable.push(v),
                Err(rejection) => rejections.push(rejection),
            }
        }

        if viable.is_empty() {
            let kind = if candidates.len() == 1 && rejections == [Rejection::TemplateDeduction] {
                ProblemKind::InvalidTemplateArguments
            } else {
                ProblemKind::InvalidArguments
            };
            return Resolved::problem(kind, request.name, candidates.iter().copied());
        }
        Self::best_of(request.name, viable)
    }

    fn best_of(name: &str, mut viable: Vec<Viable>) -> Resolved {
        if viable.len() == 1 {
            let v = viable.swap_remove(0);
            return Resolved::Binding {
                binding: v.binding,
                substitution: v.substitution,
            };
        }
        let best = viable.iter().position(|v| {
            viable
                .iter()
                .all(|w| std::ptr::eq(v, w) || Self::better(v, w))
        });
        match best {
            Some(index) => {
                let v = &viable[index];
                Resolved::Binding {
                    binding: v.binding,
                    substitution: v.substitution.clone(),
                }
            }
            None => {
                let tied = viable
                    .iter()
                    .filter(|v| !viable.iter().any(|w| Self::better(w, v)))
                    .map(|v| v.binding);
                Resolved::problem(ProblemKind::OverloadAmbiguous, name, tied)
            }
        }
    }

    /// `a` is a better match than `b`
    fn better(a: &Viable, b: &Viable) -> bool {
        let mut strictly = false;
        for (ra, rb) in a.ranks.iter().zip(&b.ranks) {
            if ra > rb {
                return false;
            }
            strictly |= ra < rb;
        }
        strictly || (!a.is_template && b.is_template)
    }

    fn viability(&self, candidate: BindingId, arguments: &[Argument], explicit: Option<&[Type]>) -> Result<Viable, Rejection> {
        let binding = self.model.binding(candidate);
        let (template, function_binding) = match &binding.kind {
            BindingKind::Function(function) => (None, Some(function)),
            BindingKind::Template(template) => match template.entity.as_ref() {
                BindingKind::Function(function) => (Some(template), Some(function)),
                _ => return Err(Rejection::Arguments),
            },
            BindingKind::Variable(_) => (None, None),
            _ => return Err(Rejection::Arguments),
        };
        if template.is_none() && explicit.is_some() {
            return Err(Rejection::TemplateDeduction);
        }
        let Some(function) = binding.ty.as_function() else {
            // A call through something of unknown type cannot be checked
            return if binding.ty.is_unknown() {
                Ok(Viable {
                    binding: candidate,
                    ranks: vec![Rank::Exact; arguments.len()],
                    is_template: false,
                    substitution: Vec::new(),
                })
            } else {
                Err(Rejection::Arguments)
            };
        };

        let defaults = function_binding.map_or(0, |f| f.default_arguments);
        let required = function.parameters.len().saturating_sub(defaults);
        if arguments.len() < required || (arguments.len() > function.parameters.len() && !function.var_args) {
            return Err(Rejection::Arguments);
        }

        let (function, substitution) = match template {
            Some(template) => {
                let substitution = deduce(&template.parameters, function, arguments, explicit.unwrap_or(&[]))
                    .ok_or(Rejection::TemplateDeduction)?;
                let substituted = Type::Function(Box::new(function.clone())).substitute(&substitution);
                let Type::Function(function) = substituted else {
                    return Err(Rejection::TemplateDeduction);
                };
                (*function, substitution)
            }
            None => (function.clone(), Vec::new()),
        };

        let mut ranks = Vec::with_capacity(arguments.len());
        for (index, argument) in arguments.iter().enumerate() {
            let rank = match function.parameters.get(index) {
                Some(parameter) => self.conversion(argument, parameter).ok_or(Rejection::Arguments)?,
                None => Rank::Ellipsis,
            };
            ranks.push(rank);
        }
        Ok(Viable {
            binding: candidate,
            ranks,
            is_template: template.is_some(),
            substitution,
        })
    }

    /// Standard conversion, or a user-defined one through a converting constructor
    fn conversion(&self, argument: &Argument, parameter: &Type) -> Option<Rank> {
        let language = self.model.language();
        if let Some(rank) = standard_conversion(argument, parameter, language) {
            return Some(rank);
        }
        let target = parameter.composite_name(false)?;
        let members = self.model.composite_members(target)?;
        let class_name = target.rsplit("::").next().unwrap_or(target);
        let constructors = self
            .model
            .lookup(members, Namespace::Ordinary, class_name, LookupQualifier::Scope(members));
        constructors
            .visible()
            .iter()
            .filter_map(|&id| {
                let binding = self.model.binding(id);
                match &binding.kind {
                    BindingKind::Function(f) if f.is_constructor => binding.ty.as_function(),
                    _ => None,
                }
            })
            .filter(|f| !f.parameters.is_empty())
            .any(|f| standard_conversion(argument, &f.parameters[0], language).is_some())
            .then_some(Rank::UserDefined)
    }

    fn resolve_literal_operator(&self, request: &Request<'_>, candidates: &[BindingId]) -> Resolved {
        let literal = request.literal.unwrap_or(LiteralKind::Integer);
        let accepted = literal_operator_signatures(literal);
        let viable: Vec<BindingId> = candidates
            .iter()
            .copied()
            .filter(|&id| {
                self.model
                    .binding(id)
                    .ty
                    .as_function()
                    .is_some_and(|f| accepted.iter().any(|signature| matches_signature(f, signature)))
            })
            .collect();
        match viable.first() {
            Some(&binding) => Resolved::binding(binding),
            None => Resolved::problem(ProblemKind::InvalidArguments, request.name, candidates.iter().copied()),
        }
    }
}

/// Parameter lists a literal operator may declare for a literal category
fn literal_operator_signatures(literal: LiteralKind) -> Vec<Vec<Type>> {
    let raw = vec![Type::const_char_pointer()];
    match literal {
        LiteralKind::Integer => vec![vec![Type::Integer(IntegerKind::UnsignedLongLong)], raw],
        LiteralKind::Float => vec![vec![Type::Floating(FloatKind::LongDouble)], raw],
        LiteralKind::Char => vec![vec![Type::Integer(IntegerKind::Char)]],
        LiteralKind::String => vec![vec![
            Type::const_char_pointer(),
            Type::Integer(IntegerKind::UnsignedLong),
        ]],
        _ => Vec::new(),
    }
}

fn matches_signature(function: &FunctionType, expected: &[Type]) -> bool {
    !function.var_args
        && function.parameters.len() == expected.len()
        && function
            .parameters
            .iter()
            .zip(expected)
            .all(|(declared, expected)| declared.adjusted_parameter() == *expected)
}

/// Deduces template arguments from call arguments; `None` on conflict or
/// when a parameter stays undeduced.
pub fn deduce(parameters: &[SmolStr], function: &FunctionType, arguments: &[Argument], explicit: &[Type]) -> Option<Substitution> {
    if explicit.len() > parameters.len() {
        return None;
    }
    let mut substitution: Substitution = parameters
        .iter()
        .cloned()
        .zip(explicit.iter().cloned())
        .collect();
    let fixed = &parameters[..explicit.len()];
    for (parameter, argument) in function.parameters.iter().zip(arguments) {
        if argument.ty.is_unknown() {
            continue;
        }
        deduce_one(parameter, &argument.ty.decay(), fixed, &mut substitution)?;
    }
    parameters
        .iter()
        .all(|p| substitution.iter().any(|(name, _)| name == p))
        .then_some(substitution)
}

fn deduce_one(parameter: &Type, argument: &Type, fixed: &[SmolStr], substitution: &mut Substitution) -> Option<()> {
    match parameter.non_reference().unqualified() {
        // Explicit arguments are not deduced; the call converts to them
        Type::Dependent(name) if fixed.contains(name) => Some(()),
        Type::Dependent(name) => {
            let argument = argument.non_reference().unqualified().clone();
            match substitution.iter().find(|(n, _)| n == name) {
                Some((_, existing)) if *existing != argument => None,
                Some(_) => Some(()),
                None => {
                    substitution.push((name.clone(), argument));
                    Some(())
                }
            }
        }
        Type::Pointer(inner) => match argument.unqualified() {
            Type::Pointer(pointee) => deduce_one(inner, pointee.unqualified(), fixed, substitution),
            _ if inner.is_dependent() => None,
            _ => Some(()),
        },
        _ => Some(()),
    }
}

/// Whether `binding` denotes a composite type usable as a member scope
pub fn composite_members_of(model: &SemanticModel, binding: BindingId) -> Option<crate::scope::FileScopeId> {
    match &model.binding(binding).kind {
        BindingKind::Type(TypeBinding::Composite { members, .. }) => *members,
        BindingKind::Type(TypeBinding::Typedef) => model
            .binding(binding)
            .ty
            .composite_name(false)
            .and_then(|name| model.composite_members(name)),
        BindingKind::Template(template) => match template.entity.as_ref() {
            BindingKind::Type(TypeBinding::Composite { members, .. }) => *members,
            _ => None,
        },
        _ => None,
    }
}
