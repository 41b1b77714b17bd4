//! # Problem Reporter
//!
//! Turns syntax problem nodes and problem bindings into [`Diagnostic`]s.
//! Checkers are registered in a [`CheckerRegistry`]; each one walks the
//! translation unit in pre-order and reports against logical source spans.

use cdom_diagnostics::{Diagnostic, DiagnosticCollection};
use cdom_parser::ast::Problem;
use cdom_parser::{NodeId, NodeKind, ParsedUnit, TokenOrigin};
use chumsky::span::SimpleSpan;

use crate::model::SemanticModel;

/// One source of diagnostics over a bound translation unit
pub trait Checker {
    fn check(&self, unit: &ParsedUnit, model: &SemanticModel) -> Vec<Diagnostic>;

    /// Name of this checker (for debugging/logging)
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

#[derive(Default)]
pub struct CheckerRegistry {
    checkers: Vec<Box<dyn Checker>>,
}

impl CheckerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_checker<C: Checker + 'static>(mut self, checker: C) -> Self {
        self.checkers.push(Box::new(checker));
        self
    }

    /// Runs every checker; the result is ordered by position
    pub fn check_all(&self, unit: &ParsedUnit, model: &SemanticModel) -> DiagnosticCollection {
        let mut collection = DiagnosticCollection::new();
        for checker in &self.checkers {
            let diagnostics = checker.check(unit, model);
            tracing::trace!(checker = checker.name(), found = diagnostics.len(), "checker finished");
            collection.extend(diagnostics);
        }
        collection.sort();
        collection
    }

    pub fn len(&self) -> usize {
        self.checkers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkers.is_empty()
    }
}

pub fn create_default_registry() -> CheckerRegistry {
    CheckerRegistry::new()
        .add_checker(SyntaxProblemChecker)
        .add_checker(ProblemBindingChecker)
}

/// Diagnostics for a bound unit, excluding preprocessor diagnostics
pub fn report_problems(unit: &ParsedUnit, model: &SemanticModel) -> Vec<Diagnostic> {
    create_default_registry()
        .check_all(unit, model)
        .into_iter()
        .collect()
}

/// Problem nodes left by syntax error recovery
pub struct SyntaxProblemChecker;

impl Checker for SyntaxProblemChecker {
    fn check(&self, unit: &ParsedUnit, _model: &SemanticModel) -> Vec<Diagnostic> {
        unit.problems()
            .into_iter()
            .filter_map(|node| {
                let NodeKind::Problem(problem) = unit.ast.kind(node) else {
                    return None;
                };
                let diagnostic = Diagnostic::syntax_error(syntax_message(problem), logical_span(unit, node));
                let diagnostic = if problem.is_error {
                    diagnostic
                } else {
                    Diagnostic::warning(diagnostic.code, diagnostic.message).with_location(diagnostic.span)
                };
                Some(diagnostic.with_file(unit.file_path.as_str()))
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "syntax"
    }
}

fn syntax_message(problem: &Problem) -> String {
    if problem.arguments.is_empty() {
        "Syntax error".to_string()
    } else {
        format!("Syntax error near '{}'", problem.arguments)
    }
}

/// Names, literals and initializers whose resolution is a problem binding
pub struct ProblemBindingChecker;

impl Checker for ProblemBindingChecker {
    fn check(&self, unit: &ParsedUnit, model: &SemanticModel) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for node in unit.ast.preorder(unit.root) {
            let Some(binding) = model.resolution(node).map(|id| model.binding(id)) else {
                continue;
            };
            let Some(problem) = binding.problem() else {
                continue;
            };
            let mut message = problem.kind.message(&problem.name);
            if !problem.candidates.is_empty() {
                message.push_str("\nCandidates are:");
                for &candidate in &problem.candidates {
                    message.push_str("\n  ");
                    message.push_str(&model.binding(candidate).signature());
                }
            }
            let mut diagnostic = Diagnostic::error(problem.kind.code(), message)
                .with_location(logical_span(unit, node))
                .with_file(unit.file_path.as_str());
            for &candidate in &problem.candidates {
                let candidate = model.binding(candidate);
                if let Some(&declaration) = candidate.declarations.first() {
                    diagnostic = diagnostic.with_related_span(
                        logical_span(unit, declaration),
                        format!("'{}' declared here", candidate.name),
                    );
                }
            }
            diagnostics.push(diagnostic);
        }
        diagnostics
    }

    fn name(&self) -> &'static str {
        "problem-bindings"
    }
}

/// Where a node is blamed in the file as written. Tokens from a macro
/// argument keep their span, clipped to the argument region; tokens from a
/// replacement list are blamed on the outermost invocation's macro name.
pub fn logical_span(unit: &ParsedUnit, node: NodeId) -> SimpleSpan<usize> {
    let node = unit.ast.node(node);
    match node.origin {
        TokenOrigin::Source => node.span,
        TokenOrigin::MacroArgument(id) => {
            let expansion = unit.expansion(id);
            match (expansion.parent, expansion.arguments_span) {
                (None, Some(arguments)) => clip(node.span, arguments),
                (None, None) => node.span,
                (Some(_), _) => root_invocation_name(unit, node.origin),
            }
        }
        TokenOrigin::MacroBody(_) => root_invocation_name(unit, node.origin),
    }
}

fn root_invocation_name(unit: &ParsedUnit, origin: TokenOrigin) -> SimpleSpan<usize> {
    let Some(mut id) = origin.expansion() else {
        return SimpleSpan::from(0..0);
    };
    while let Some(parent) = unit.expansion(id).parent {
        id = parent;
    }
    unit.expansion(id).name_span
}

fn clip(span: SimpleSpan<usize>, region: SimpleSpan<usize>) -> SimpleSpan<usize> {
    let start = span.start.clamp(region.start, region.end);
    let end = span.end.clamp(start, region.end);
    SimpleSpan::from(start..end)
}
