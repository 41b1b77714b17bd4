use std::fmt::Debug;

use cdom_diagnostics::build_diagnostic_message;
use cdom_parser::ast::{Expression, NodeKind};
use cdom_parser::{
    parse_translation_unit, CancellationToken, Language, NodeId, ParseError, ParsedUnit,
    ParserDb, ParserOptions, Upcast,
};

#[salsa::db]
#[derive(Clone, Default)]
pub struct TestDb {
    storage: salsa::Storage<Self>,
}

#[salsa::db]
impl salsa::Database for TestDb {}
#[salsa::db]
impl ParserDb for TestDb {}

impl Upcast<dyn ParserDb> for TestDb {
    fn upcast(&self) -> &(dyn ParserDb + 'static) {
        self
    }
    fn upcast_mut(&mut self) -> &mut (dyn ParserDb + 'static) {
        self
    }
}

pub fn test_db() -> TestDb {
    TestDb::default()
}

fn file_name(language: Language) -> &'static str {
    match language {
        Language::C => "test.c",
        Language::Cpp => "test.cpp",
    }
}

pub fn try_parse(code: &str, language: Language) -> Result<ParsedUnit, ParseError> {
    parse_translation_unit(
        code,
        file_name(language),
        &ParserOptions::for_language(language),
        &CancellationToken::new(),
    )
}

/// Parses `code`, panicking on internal errors and on syntax problems
#[track_caller]
pub fn assert_parses_ok_impl(code: &str, language: Language, test_name: &str) -> ParsedUnit {
    let unit = try_parse(code, language)
        .unwrap_or_else(|e| panic!("{test_name}: parse of {code:?} aborted: {e}"));
    let problems = unit.problems();
    if !problems.is_empty() {
        let rendered = problems
            .iter()
            .map(|&id| format!("{} at {:?}", label(&unit, id), unit.ast.span(id)))
            .collect::<Vec<_>>()
            .join("\n");
        panic!("{test_name}: expected no syntax problems in {code:?}, got:\n{rendered}");
    }
    if let Some(diagnostic) = unit.diagnostics.first() {
        panic!(
            "{test_name}: unexpected preprocessor diagnostic:\n{}",
            build_diagnostic_message(code, diagnostic, false)
        );
    }
    assert_spans_nested(&unit);
    unit
}

/// Parses `code` and asserts that at least one syntax problem was recorded
#[track_caller]
pub fn assert_parses_err_impl(code: &str, language: Language, test_name: &str) -> ParsedUnit {
    let unit = try_parse(code, language)
        .unwrap_or_else(|e| panic!("{test_name}: parse of {code:?} aborted: {e}"));
    assert!(
        !unit.problems().is_empty(),
        "{test_name}: expected syntax problems in {code:?}"
    );
    assert_spans_nested(&unit);
    unit
}

#[macro_export]
macro_rules! assert_parses_ok {
    ($code:expr) => {{
        let function_name = stdext::function_name!();
        $crate::common::assert_parses_ok_impl($code, cdom_parser::Language::C, function_name)
    }};
    ($code:expr, $language:expr) => {{
        let function_name = stdext::function_name!();
        $crate::common::assert_parses_ok_impl($code, $language, function_name)
    }};
}

#[macro_export]
macro_rules! assert_parses_err {
    ($code:expr) => {{
        let function_name = stdext::function_name!();
        $crate::common::assert_parses_err_impl($code, cdom_parser::Language::C, function_name)
    }};
    ($code:expr, $language:expr) => {{
        let function_name = stdext::function_name!();
        $crate::common::assert_parses_err_impl($code, $language, function_name)
    }};
}

/// Every node lies within its parent and has a well-formed span
#[track_caller]
pub fn assert_spans_nested(unit: &ParsedUnit) {
    for (id, node) in unit.ast.iter() {
        assert!(node.span.start <= node.span.end, "{id:?} has an inverted span");
        if let Some(parent) = node.parent {
            let outer = unit.ast.span(parent);
            assert!(
                outer.start <= node.span.start && node.span.end <= outer.end,
                "{} {:?} escapes its parent {} {:?}",
                label(unit, id),
                node.span,
                label(unit, parent),
                outer
            );
        }
    }
}

/// Top-level declarations of the unit
pub fn declarations(unit: &ParsedUnit) -> Vec<NodeId> {
    unit.ast
        .translation_unit(unit.root)
        .map(|tu| tu.declarations.clone())
        .unwrap_or_default()
}

/// First node in pre-order matching `predicate`
pub fn find(unit: &ParsedUnit, predicate: impl Fn(&NodeKind) -> bool) -> Option<NodeId> {
    unit.ast
        .preorder(unit.root)
        .into_iter()
        .find(|&id| predicate(unit.ast.kind(id)))
}

/// The expression node whose `Id` names `text`
pub fn find_id_expression(unit: &ParsedUnit, text: &str) -> Option<NodeId> {
    find(unit, |kind| match kind {
        NodeKind::Expression(Expression::Id { name }) => unit.ast.name_text(*name) == text,
        _ => false,
    })
}

fn head(value: &impl Debug) -> String {
    let text = format!("{value:?}");
    text.split(|c: char| !c.is_alphanumeric() && c != '_')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// One-line description of a node for dumps and failure messages
pub fn label(unit: &ParsedUnit, id: NodeId) -> String {
    match unit.ast.kind(id) {
        NodeKind::Name(name) => format!("Name {:?}", name.text.as_str()),
        NodeKind::Expression(Expression::Literal(literal)) => match &literal.suffix {
            Some(suffix) => format!("Literal {} {}", literal.value, suffix),
            None => format!("Literal {}", literal.value),
        },
        NodeKind::Expression(Expression::Binary { op, .. }) => format!("Binary {op}"),
        NodeKind::Expression(Expression::Unary { op, .. }) => format!("Unary {op:?}"),
        NodeKind::Expression(expr) => head(expr),
        NodeKind::Statement(stmt) => head(stmt),
        NodeKind::Declaration(decl) => head(decl),
        NodeKind::DeclSpecifier(spec) => format!("DeclSpecifier {:?}", spec.simple),
        NodeKind::Declarator(declarator) => format!("Declarator {}", head(&declarator.kind)),
        NodeKind::PointerOperator(pointer) => format!("PointerOperator {:?}", pointer.kind),
        NodeKind::Initializer(init) => format!("Initializer {}", head(init)),
        NodeKind::Problem(problem) => format!("Problem {:?}", problem.arguments.as_str()),
        other => head(other),
    }
}

/// Indented pre-order dump with spans, for inline snapshots
pub fn dump(unit: &ParsedUnit) -> String {
    let mut lines = Vec::new();
    let mut stack = vec![(unit.root, 0usize)];
    while let Some((id, depth)) = stack.pop() {
        let span = unit.ast.span(id);
        lines.push(format!(
            "{}{} {}..{}",
            "  ".repeat(depth),
            label(unit, id),
            span.start,
            span.end
        ));
        let children = unit.ast.kind(id).children();
        stack.extend(children.into_iter().rev().map(|child| (child, depth + 1)));
    }
    lines.join("\n")
}

/// Wraps statement code in a function body, since statements are not top-level
pub fn in_function(code: &str) -> String {
    format!("void test(void) {{ {code} }}")
}

#[track_caller]
pub fn assert_parses_parameterized_impl(inputs: &[(&str, bool)], language: Language, test_name: &str) {
    for (index, (code, should_succeed)) in inputs.iter().enumerate() {
        let case = format!("{test_name}[{index}]");
        if *should_succeed {
            assert_parses_ok_impl(code, language, &case);
        } else {
            assert_parses_err_impl(code, language, &case);
        }
    }
}

/// `assert_parses_parameterized! { ok: [...], err: [...] }`, optionally with a language
#[macro_export]
macro_rules! assert_parses_parameterized {
    (ok: [$($ok:expr),* $(,)?], err: [$($err:expr),* $(,)?] $(, language: $language:expr)?) => {{
        let inputs: Vec<(&str, bool)> = vec![
            $(($ok, true),)*
            $(($err, false),)*
        ];
        #[allow(unused_mut, unused_assignments)]
        let mut language = cdom_parser::Language::C;
        $(language = $language;)?
        let function_name = stdext::function_name!();
        $crate::common::assert_parses_parameterized_impl(&inputs, language, function_name)
    }};
}
