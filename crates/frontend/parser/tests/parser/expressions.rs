//! Expression parsing: precedence, casts, calls, member access and literals

use cdom_parser::ast::{BinaryOp, Expression, LiteralKind, NodeKind, Statement, UnaryOp};
use cdom_parser::{NodeId, ParsedUnit};
use insta::assert_snapshot;

use crate::assert_parses_ok;
use crate::common::{dump, find, in_function};

/// Parses `code` as an expression statement and returns the expression
#[track_caller]
fn expression(code: &str) -> (ParsedUnit, NodeId) {
    let source = in_function(&format!("{code};"));
    let unit = assert_parses_ok!(&source);
    let statement = find(&unit, |kind| {
        matches!(kind, NodeKind::Statement(Statement::Expression { .. }))
    })
    .expect("expression statement");
    let Some(Statement::Expression { expression }) = unit.ast.statement(statement) else {
        unreachable!()
    };
    let expression = *expression;
    (unit, expression)
}

fn expr(unit: &ParsedUnit, id: NodeId) -> &Expression {
    unit.ast.expression(id).expect("expression node")
}

#[test]
fn binary_precedence_snapshot() {
    let unit = assert_parses_ok!("int x = a + b * c;");
    assert_snapshot!(dump(&unit), @r#"
    TranslationUnit 0..18
      Simple 0..18
        DeclSpecifier Int 0..3
        Declarator Plain 4..17
          Name "x" 4..5
          Initializer Expression 8..17
            Binary + 8..17
              Id 8..9
                Name "a" 8..9
              Binary * 12..17
                Id 12..13
                  Name "b" 12..13
                Id 16..17
                  Name "c" 16..17
    "#);
}

#[test]
fn assignment_is_right_associative() {
    let (unit, root) = expression("a = b = c");
    let Expression::Binary { op, rhs, .. } = expr(&unit, root) else {
        panic!("expected assignment");
    };
    assert_eq!(*op, BinaryOp::Assign);
    assert!(matches!(
        expr(&unit, *rhs),
        Expression::Binary { op: BinaryOp::Assign, .. }
    ));
}

#[test]
fn shift_binds_tighter_than_relational() {
    let (unit, root) = expression("a << 1 < b");
    let Expression::Binary { op, lhs, .. } = expr(&unit, root) else {
        panic!("expected comparison");
    };
    assert_eq!(*op, BinaryOp::LessThan);
    assert!(matches!(
        expr(&unit, *lhs),
        Expression::Binary { op: BinaryOp::ShiftLeft, .. }
    ));
}

#[test]
fn conditional_expression() {
    let (unit, root) = expression("x = c ? 1 : 2");
    let Expression::Binary { rhs, .. } = expr(&unit, root) else {
        panic!("expected assignment");
    };
    assert!(matches!(expr(&unit, *rhs), Expression::Conditional { .. }));
}

#[test]
fn cast_needs_a_type_name() {
    let (unit, root) = expression("(int)x");
    assert!(matches!(expr(&unit, root), Expression::Cast { .. }));

    let (unit, root) = expression("(x) + 1");
    let Expression::Binary { lhs, .. } = expr(&unit, root) else {
        panic!("expected addition");
    };
    assert!(matches!(
        expr(&unit, *lhs),
        Expression::Unary { op: UnaryOp::Bracketed, .. }
    ));
}

#[test]
fn sizeof_forms() {
    let (unit, root) = expression("sizeof(int *)");
    let Expression::TypeIdOperation { type_id, .. } = expr(&unit, root) else {
        panic!("expected sizeof(type)");
    };
    let NodeKind::TypeId(type_id) = unit.ast.kind(*type_id) else {
        panic!("expected type-id");
    };
    assert!(type_id.declarator.is_some());

    let (unit, root) = expression("sizeof x");
    assert!(matches!(
        expr(&unit, root),
        Expression::Unary { op: UnaryOp::Sizeof, .. }
    ));
}

#[test]
fn call_arguments_are_flattened() {
    let (unit, root) = expression("f(1, 2, 3)");
    let Expression::FunctionCall { argument, .. } = expr(&unit, root) else {
        panic!("expected call");
    };
    assert_eq!(unit.ast.call_arguments(*argument).len(), 3);

    let (unit, root) = expression("g()");
    let Expression::FunctionCall { argument, .. } = expr(&unit, root) else {
        panic!("expected call");
    };
    assert_eq!(*argument, None);

    let (unit, root) = expression("h(a)");
    let Expression::FunctionCall { argument, .. } = expr(&unit, root) else {
        panic!("expected call");
    };
    assert_eq!(unit.ast.call_arguments(*argument).len(), 1);
}

#[test]
fn field_references_chain() {
    let (unit, root) = expression("p->x.y");
    let Expression::FieldReference {
        owner,
        field,
        is_pointer,
    } = expr(&unit, root)
    else {
        panic!("expected field reference");
    };
    assert!(!is_pointer);
    assert_eq!(unit.ast.name_text(*field), "y");
    assert!(matches!(
        expr(&unit, *owner),
        Expression::FieldReference { is_pointer: true, .. }
    ));
}

#[test]
fn postfix_and_prefix_operators() {
    let (unit, root) = expression("i++");
    assert!(matches!(
        expr(&unit, root),
        Expression::Unary { op: UnaryOp::PostfixIncr, .. }
    ));
    let (unit, root) = expression("--i");
    assert!(matches!(
        expr(&unit, root),
        Expression::Unary { op: UnaryOp::PrefixDecr, .. }
    ));
    let (unit, root) = expression("a[i][j]");
    let Expression::ArraySubscript { array, .. } = expr(&unit, root) else {
        panic!("expected subscript");
    };
    assert!(matches!(expr(&unit, *array), Expression::ArraySubscript { .. }));
}

#[test]
fn literal_kinds() {
    let cases = [
        ("'c'", LiteralKind::Char),
        ("\"s\"", LiteralKind::String),
        ("1.5", LiteralKind::Float),
        ("0x10", LiteralKind::Integer),
        ("L\"wide\"", LiteralKind::String),
    ];
    for (code, kind) in cases {
        let (unit, root) = expression(code);
        let Expression::Literal(literal) = expr(&unit, root) else {
            panic!("{code} is not a literal");
        };
        assert_eq!(literal.kind, kind, "{code}");
        assert_eq!(literal.suffix, None);
    }
}

#[test]
fn adjacent_string_literals_form_one_literal() {
    let unit = assert_parses_ok!("const char *s = \"a\" \"b\"\n    \"c\";");
    let id = find(&unit, |kind| {
        matches!(kind, NodeKind::Expression(Expression::Literal(_)))
    })
    .expect("initializer literal");
    let Expression::Literal(literal) = expr(&unit, id) else {
        unreachable!()
    };
    assert_eq!(literal.kind, LiteralKind::String);
    assert_eq!(literal.value, "\"a\" \"b\" \"c\"");
    assert_eq!(unit.ast.span(id).into_range(), 16..31);
}

#[test]
fn comma_expression_is_a_list() {
    let (unit, root) = expression("a = 1, b = 2");
    let Expression::List { expressions } = expr(&unit, root) else {
        panic!("expected list");
    };
    assert_eq!(expressions.len(), 2);
    assert_eq!(unit.ast.span(root).into_range(), 18..30);
}
