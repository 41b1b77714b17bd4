//! Declarator promotion and span tracking

use cdom_parser::ast::{Declaration, DeclaratorKind, NodeKind, Statement, StorageClass};
use insta::assert_snapshot;

use crate::common::{declarations, dump, find};
use crate::{assert_parses_err, assert_parses_ok, assert_parses_parameterized};

fn top_declarator(unit: &cdom_parser::ParsedUnit, index: usize) -> cdom_parser::NodeId {
    let decl = declarations(unit)[index];
    match unit.ast.declaration(decl) {
        Some(Declaration::Simple { declarators, .. }) => declarators[0],
        Some(Declaration::FunctionDefinition { declarator, .. }) => *declarator,
        other => panic!("not a declaration with declarators: {other:?}"),
    }
}

#[test]
fn array_declarator_is_promoted_in_place() {
    let unit = assert_parses_ok!("int a[3];");
    assert_snapshot!(dump(&unit), @r#"
    TranslationUnit 0..9
      Simple 0..9
        DeclSpecifier Int 0..3
        Declarator Array 4..8
          Name "a" 4..5
          ArrayModifier 5..8
            Literal 3 6..7
    "#);
}

#[test]
fn function_pointer_declarator_starts_at_nested_declarator() {
    let unit = assert_parses_ok!("int (*fp)(int);");
    assert_snapshot!(dump(&unit), @r#"
    TranslationUnit 0..15
      Simple 0..15
        DeclSpecifier Int 0..3
        Declarator Function 5..14
          Name "" 5..5
          Declarator Plain 5..8
            PointerOperator Pointer 5..6
            Name "fp" 6..8
          ParameterDeclaration 10..13
            DeclSpecifier Int 10..13
            Declarator Plain 13..13
              Name "" 13..13
    "#);
}

#[test]
fn second_array_dimension_extends_the_declarator() {
    let unit = assert_parses_ok!("int m[2][3];");
    let declarator = top_declarator(&unit, 0);
    assert_eq!(unit.ast.span(declarator).into_range(), 4..11);
    let Some(DeclaratorKind::Array { modifiers }) =
        unit.ast.declarator(declarator).map(|d| &d.kind)
    else {
        panic!("expected an array declarator");
    };
    assert_eq!(modifiers.len(), 2);
    assert_eq!(unit.ast.span(modifiers[1]).into_range(), 8..11);
}

#[test]
fn function_declarator_starts_at_its_name() {
    let unit = assert_parses_ok!("static int f(void);");
    let declarator = top_declarator(&unit, 0);
    assert_eq!(unit.ast.span(declarator).into_range(), 11..18);
    let decl = unit.ast.declarator(declarator).unwrap();
    assert!(matches!(
        &decl.kind,
        DeclaratorKind::Function { parameters, var_args: false } if parameters.len() == 1
    ));
    assert_eq!(unit.ast.name_text(decl.name), "f");
}

#[test]
fn array_of_function_pointers() {
    let unit = assert_parses_ok!("int (*table[4])(void);");
    let outer = top_declarator(&unit, 0);
    assert_eq!(unit.ast.span(outer).into_range(), 5..21);
    let outer_decl = unit.ast.declarator(outer).unwrap();
    assert!(matches!(outer_decl.kind, DeclaratorKind::Function { .. }));

    let inner = outer_decl.nested.expect("nested declarator");
    let inner_decl = unit.ast.declarator(inner).unwrap();
    assert!(matches!(inner_decl.kind, DeclaratorKind::Array { .. }));
    assert_eq!(inner_decl.pointer_ops.len(), 1);
    assert_eq!(unit.ast.span(inner).into_range(), 5..14);
    assert_eq!(unit.ast.name_text(unit.ast.declarator_name(outer)), "table");
}

#[test]
fn array_on_bracketed_declarator_wraps_it() {
    let unit = assert_parses_ok!("int (*p)[3];");
    let outer = top_declarator(&unit, 0);
    let outer_decl = unit.ast.declarator(outer).unwrap();
    assert!(matches!(outer_decl.kind, DeclaratorKind::Array { .. }));
    assert_eq!(unit.ast.span(outer).into_range(), 4..11);
    let bracketed = outer_decl.nested.expect("bracketed declarator");
    assert_eq!(unit.ast.span(bracketed).into_range(), 4..8);
    assert_eq!(unit.ast.name_text(unit.ast.declarator_name(outer)), "p");
}

#[test]
fn implicit_int_function_definition() {
    let unit = assert_parses_ok!("main() { }");
    let decl = declarations(&unit)[0];
    let Some(Declaration::FunctionDefinition { decl_spec, .. }) = unit.ast.declaration(decl) else {
        panic!("expected a function definition");
    };
    assert_eq!(unit.ast.span(*decl_spec).into_range(), 0..0);
}

#[test]
fn bit_field_width_is_attached() {
    let unit = assert_parses_ok!("struct S { unsigned flag : 1; };");
    let declarator = find(&unit, |kind| {
        matches!(kind, NodeKind::Declarator(d) if d.bit_width.is_some())
    })
    .expect("bit-field declarator");
    assert_eq!(
        unit.ast.name_text(unit.ast.declarator_name(declarator)),
        "flag"
    );
}

#[test]
fn typedef_name_starts_a_declaration_statement() {
    let unit = assert_parses_ok!("void f(void) { typedef int T; T * x; x = 0; }");
    let statements: Vec<_> = unit
        .ast
        .iter()
        .filter_map(|(_, node)| match &node.kind {
            NodeKind::Statement(stmt @ (Statement::Declaration { .. } | Statement::Expression { .. })) => {
                Some(stmt.clone())
            }
            _ => None,
        })
        .collect();
    assert_eq!(statements.len(), 3);
    assert!(matches!(statements[1], Statement::Declaration { .. }));
    assert!(matches!(statements[2], Statement::Expression { .. }));

    let typedef = find(&unit, |kind| {
        matches!(kind, NodeKind::DeclSpecifier(spec) if spec.storage == StorageClass::Typedef)
    });
    assert!(typedef.is_some());
}

#[test]
fn declarations_parameterized() {
    assert_parses_parameterized! {
        ok: [
            "int a, *b, c[2];",
            "typedef int myint; myint x;",
            "struct point { int x; int y; } p;",
            "enum color { RED, GREEN = 2, BLUE };",
            "union u { int i; float f; };",
            "extern const volatile unsigned long long int big;",
            "void f(int, char *, ...);",
            "static inline int sq(int x) { return x * x; }",
            "int (*signal(int sig, void (*handler)(int)))(int);",
            "char *const *argv;",
        ],
        err: [
            "int a[3;",
            "struct { int x; ",
            "int f(int a b);",
        ]
    }
}

#[test]
fn missing_declarator_name_is_a_problem() {
    let unit = assert_parses_err!("int *;");
    assert_eq!(unit.problems().len(), 1);
}

#[test]
fn block_comments_between_declarations() {
    let unit = assert_parses_ok!("int a; /* note */ int b;\n/* spans\n lines */ int c /* inline */ = 1;");
    assert_eq!(declarations(&unit).len(), 3);
    assert_eq!(unit.ast.span(declarations(&unit)[1]).into_range(), 18..24);
}
