//! Macro expansion and origin tracking

use cdom_diagnostics::DiagnosticCode;
use cdom_parser::ast::{Expression, NodeKind};
use cdom_parser::{Language, TokenOrigin};

use crate::assert_parses_ok;
use crate::common::{declarations, find, find_id_expression, try_parse};

#[test]
fn macro_argument_keeps_its_source_span() {
    let code = "#define CALL(x) x\nvoid f(void) { CALL(foo()); }";
    let unit = assert_parses_ok!(code);
    let callee = find_id_expression(&unit, "foo").expect("callee");
    let node = unit.ast.node(callee);
    let TokenOrigin::MacroArgument(expansion) = node.origin else {
        panic!("expected a macro argument origin, got {:?}", node.origin);
    };
    let start = code.find("foo").unwrap();
    assert_eq!(node.span.into_range(), start..start + 3);

    let expansion = unit.expansion(expansion);
    assert_eq!(expansion.macro_name, "CALL");
    let arguments = expansion.arguments_span.expect("function-like invocation");
    assert_eq!(&code[arguments.into_range()], "foo()");
    assert_eq!(&code[expansion.invocation_span.into_range()], "CALL(foo())");
}

#[test]
fn macro_body_tokens_take_the_invocation_span() {
    let unit = assert_parses_ok!("#define N 10\nint a[N];");
    let literal = find(&unit, |kind| {
        matches!(kind, NodeKind::Expression(Expression::Literal(_)))
    })
    .expect("array size");
    let node = unit.ast.node(literal);
    assert!(matches!(node.origin, TokenOrigin::MacroBody(_)));
    assert_eq!(node.span.into_range(), 19..20);
    assert_eq!(unit.macros.len(), 1);
    assert_eq!(unit.macros[0].name, "N");
    assert!(unit.macros[0].parameters.is_none());
}

#[test]
fn nested_expansions_record_their_parent() {
    let unit = assert_parses_ok!("#define ONE 1\n#define TWO (ONE + ONE)\nint x = TWO;");
    assert_eq!(unit.expansions.len(), 3);
    let outer = unit
        .expansions
        .iter_enumerated()
        .find(|(_, e)| e.macro_name == "TWO")
        .map(|(id, _)| id)
        .unwrap();
    assert_eq!(unit.expansion(outer).parent, None);
    assert!(unit
        .expansions
        .iter()
        .filter(|e| e.macro_name == "ONE")
        .all(|e| e.parent == Some(outer)));
}

#[test]
fn stringify_and_paste() {
    let unit = assert_parses_ok!(
        "#define STR(x) #x\n#define CAT(a, b) a##b\nint CAT(my, var);\nconst char *s = STR(hello);"
    );
    let decls = declarations(&unit);
    let declarator = find(&unit, |kind| matches!(kind, NodeKind::Declarator(_))).unwrap();
    assert_eq!(
        unit.ast.name_text(unit.ast.declarator_name(declarator)),
        "myvar"
    );
    assert_eq!(decls.len(), 2);
    let literal = find(&unit, |kind| {
        matches!(kind, NodeKind::Expression(Expression::Literal(_)))
    })
    .unwrap();
    let Some(Expression::Literal(literal)) = unit.ast.expression(literal) else {
        unreachable!()
    };
    assert_eq!(literal.value, "\"hello\"");
}

#[test]
fn stringified_argument_concatenates_with_a_string() {
    let unit = assert_parses_ok!("#define S(x) #x\nconst char *q = \"x\" S(y);");
    let literal = find(&unit, |kind| {
        matches!(kind, NodeKind::Expression(Expression::Literal(_)))
    })
    .unwrap();
    let Some(Expression::Literal(literal)) = unit.ast.expression(literal) else {
        unreachable!()
    };
    assert_eq!(literal.value, "\"x\" \"y\"");
}

#[test]
fn variadic_macro() {
    let unit = assert_parses_ok!(
        "int printf(const char *f, ...);\n#define LOG(fmt, ...) printf(fmt, __VA_ARGS__)\nvoid g(void) { LOG(\"%d %d\", 1, 2); }"
    );
    let call = find(&unit, |kind| {
        matches!(kind, NodeKind::Expression(Expression::FunctionCall { .. }))
    })
    .unwrap();
    let Some(Expression::FunctionCall { argument, .. }) = unit.ast.expression(call) else {
        unreachable!()
    };
    assert_eq!(unit.ast.call_arguments(*argument).len(), 3);
    assert!(unit.macros[0].variadic);
}

#[test]
fn conditional_blocks_select_tokens() {
    let unit = assert_parses_ok!("#define X\n#ifdef X\nint a;\n#else\nint b;\n#endif");
    let decls = declarations(&unit);
    assert_eq!(decls.len(), 1);
    let declarator = find(&unit, |kind| matches!(kind, NodeKind::Declarator(_))).unwrap();
    assert_eq!(
        unit.ast.name_text(unit.ast.declarator_name(declarator)),
        "a"
    );

    let unit = assert_parses_ok!("#if 1 + 1 == 3\nint a;\n#elif defined(__STDC_VERSION__)\nint c;\n#endif");
    let declarator = find(&unit, |kind| matches!(kind, NodeKind::Declarator(_))).unwrap();
    assert_eq!(
        unit.ast.name_text(unit.ast.declarator_name(declarator)),
        "c"
    );
}

#[test]
fn unterminated_conditional_is_reported() {
    let unit = try_parse("#ifdef X\nint a;", Language::C).unwrap();
    assert_eq!(unit.diagnostics.len(), 1);
    assert_eq!(unit.diagnostics[0].code, DiagnosticCode::InvalidDirective);
    assert_eq!(unit.diagnostics[0].file_path, "test.c");
    assert!(declarations(&unit).is_empty());
    assert_eq!(unit.ast.span(unit.root).into_range(), 0..0);
}

#[test]
fn unknown_directive_is_reported_and_skipped() {
    let unit = try_parse("#frobnicate now\nint a;", Language::C).unwrap();
    assert_eq!(unit.diagnostics.len(), 1);
    assert!(unit.diagnostics[0].message.contains("frobnicate"));
    assert_eq!(declarations(&unit).len(), 1);
}

#[test]
fn includes_are_ignored() {
    let unit = assert_parses_ok!("#include <stdio.h>\nint a;");
    assert_eq!(declarations(&unit).len(), 1);
}
