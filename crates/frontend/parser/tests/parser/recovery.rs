//! Syntax problems are recorded as nodes and parsing continues

use cdom_parser::ast::{Declaration, Expression, NodeKind, ProblemId, Statement};
use insta::assert_snapshot;

use crate::assert_parses_err;
use crate::common::{declarations, dump, find};

#[test]
fn declaration_problem_then_next_declaration() {
    let unit = assert_parses_err!("int a = ;\nint b;");
    assert_snapshot!(dump(&unit), @r#"
    TranslationUnit 0..16
      Problem 0..9
        Problem "int a = ;" 0..9
      Simple 10..16
        DeclSpecifier Int 10..13
        Declarator Plain 14..15
          Name "b" 14..15
    "#);
    let problem = unit.problems()[0];
    let NodeKind::Problem(problem) = unit.ast.kind(problem) else {
        unreachable!()
    };
    assert_eq!(problem.id, ProblemId::SyntaxError);
    assert!(problem.is_error);
}

#[test]
fn statement_problem_inside_body() {
    let unit = assert_parses_err!("void f(void) { x = ; return; }");
    let body = find(&unit, |kind| {
        matches!(kind, NodeKind::Statement(Statement::Compound { .. }))
    })
    .unwrap();
    let Some(Statement::Compound { statements }) = unit.ast.statement(body) else {
        unreachable!()
    };
    assert_eq!(statements.len(), 2);
    assert!(matches!(
        unit.ast.statement(statements[0]),
        Some(Statement::Problem { .. })
    ));
    assert_eq!(unit.ast.span(statements[0]).into_range(), 15..20);
    assert!(matches!(
        unit.ast.statement(statements[1]),
        Some(Statement::Return { .. })
    ));
}

#[test]
fn invalid_token_becomes_expression_problem() {
    let unit = assert_parses_err!("int a = @;");
    let decls = declarations(&unit);
    assert!(matches!(
        unit.ast.declaration(decls[0]),
        Some(Declaration::Simple { .. })
    ));
    let holder = find(&unit, |kind| {
        matches!(kind, NodeKind::Expression(Expression::Problem { .. }))
    })
    .expect("expression problem");
    assert_eq!(unit.ast.span(holder).into_range(), 8..9);
    assert_eq!(unit.problems().len(), 1);
}

#[test]
fn unbalanced_block_recovers_at_closing_brace() {
    let unit = assert_parses_err!("void f(void) { if (x { y; } } int z;");
    let decls = declarations(&unit);
    assert_eq!(decls.len(), 2);
    assert!(matches!(
        unit.ast.declaration(decls[0]),
        Some(Declaration::FunctionDefinition { .. })
    ));
    assert!(matches!(
        unit.ast.declaration(decls[1]),
        Some(Declaration::Simple { .. })
    ));
    let problem = unit.problems()[0];
    let NodeKind::Problem(problem) = unit.ast.kind(problem) else {
        unreachable!()
    };
    assert_eq!(problem.arguments, "if (x { y; }");
}

#[test]
fn stray_closing_brace_is_skipped() {
    let unit = assert_parses_err!("} int a;");
    let decls = declarations(&unit);
    assert_eq!(decls.len(), 2);
    assert_eq!(unit.ast.span(decls[0]).into_range(), 0..1);
}

#[test]
fn translation_unit_span_ends_at_last_declaration() {
    let unit = assert_parses_err!("int a; int b = ;   ");
    assert_eq!(unit.ast.span(unit.root).into_range(), 0..16);

    let unit = crate::common::try_parse("  /* nothing */  ", cdom_parser::Language::C).unwrap();
    assert_eq!(unit.ast.span(unit.root).into_range(), 0..0);
    assert!(declarations(&unit).is_empty());
}
