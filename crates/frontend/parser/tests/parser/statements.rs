//! Statements inside function bodies

use cdom_parser::ast::{NodeKind, Statement};
use cdom_parser::ParsedUnit;
use insta::assert_snapshot;

use crate::common::{dump, find};
use crate::{assert_parses_ok, assert_parses_parameterized};

/// Statements of the first compound statement, in source order
fn body(unit: &ParsedUnit) -> Vec<Statement> {
    let compound = find(unit, |kind| {
        matches!(kind, NodeKind::Statement(Statement::Compound { .. }))
    })
    .expect("function body");
    let Some(Statement::Compound { statements }) = unit.ast.statement(compound) else {
        unreachable!()
    };
    statements
        .iter()
        .filter_map(|&id| unit.ast.statement(id).cloned())
        .collect()
}

#[test]
fn for_statement_with_empty_clauses() {
    let unit = assert_parses_ok!("void f(void) { for (;;) break; }");
    assert_snapshot!(dump(&unit), @r#"
    TranslationUnit 0..32
      FunctionDefinition 0..32
        DeclSpecifier Void 0..4
        Declarator Function 5..12
          Name "f" 5..6
          ParameterDeclaration 7..11
            DeclSpecifier Void 7..11
            Declarator Plain 11..11
              Name "" 11..11
        Compound 13..32
          For 15..30
            Null 20..21
            Break 24..30
    "#);
}

#[test]
fn for_statement_with_declaration() {
    let unit = assert_parses_ok!("void f(void) { for (int i = 0; i < 10; i++) ; }");
    let statements = body(&unit);
    let Statement::For {
        initializer,
        condition,
        iteration,
        ..
    } = &statements[0]
    else {
        panic!("expected for statement");
    };
    assert!(matches!(
        unit.ast.statement(*initializer),
        Some(Statement::Declaration { .. })
    ));
    assert!(condition.is_some());
    assert!(iteration.is_some());
}

#[test]
fn labels_and_goto() {
    let unit = assert_parses_ok!("void f(void) { goto end; end: return; }");
    let statements = body(&unit);
    let Statement::Goto { label } = &statements[0] else {
        panic!("expected goto");
    };
    assert_eq!(unit.ast.name_text(*label), "end");
    let Statement::Labeled { label, body } = &statements[1] else {
        panic!("expected labeled statement");
    };
    assert_eq!(unit.ast.name_text(*label), "end");
    assert!(matches!(
        unit.ast.statement(*body),
        Some(Statement::Return { value: None })
    ));
}

#[test]
fn switch_body_keeps_case_labels_as_siblings() {
    let unit = assert_parses_ok!("void f(int x) { switch (x) { case 1: break; default: ; } }");
    let switch = find(&unit, |kind| {
        matches!(kind, NodeKind::Statement(Statement::Switch { .. }))
    })
    .expect("switch statement");
    let Some(Statement::Switch { body, .. }) = unit.ast.statement(switch) else {
        unreachable!()
    };
    let Some(Statement::Compound { statements }) = unit.ast.statement(*body) else {
        panic!("expected compound body");
    };
    let kinds: Vec<_> = statements
        .iter()
        .map(|&id| match unit.ast.statement(id) {
            Some(Statement::Case { .. }) => "case",
            Some(Statement::Break) => "break",
            Some(Statement::Default) => "default",
            Some(Statement::Null) => "null",
            _ => "other",
        })
        .collect();
    assert_eq!(kinds, vec!["case", "break", "default", "null"]);
}

#[test]
fn dangling_else_binds_to_nearest_if() {
    let unit = assert_parses_ok!("void f(int a, int b) { if (a) if (b) return; else return; }");
    let statements = body(&unit);
    let Statement::If {
        then_clause,
        else_clause,
        ..
    } = &statements[0]
    else {
        panic!("expected if");
    };
    assert_eq!(*else_clause, None);
    assert!(matches!(
        unit.ast.statement(*then_clause),
        Some(Statement::If {
            else_clause: Some(_),
            ..
        })
    ));
}

#[test]
fn statements_parameterized() {
    assert_parses_parameterized! {
        ok: [
            "void f(void) { while (1) continue; }",
            "void f(void) { do { } while (0); }",
            "int f(int x) { return x ? x : -x; }",
            "void f(void) { int a = 1, b; { int c; } ; }",
            "void f(int *p) { *p = p[0] + sizeof *p; }",
            "void f(void) { struct s { int x; } v; v.x = 1; }",
            "void f(void) { enum e { A, B } v = A; }",
        ],
        err: [
            "void f(void) { while 1) ; }",
            "void f(void) { return }",
            "void f(void) { case; }",
        ]
    }
}
