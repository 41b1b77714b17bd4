//! C++ dialect: constructors, user-defined literals, qualified and template names

use cdom_parser::ast::{
    Declaration, DeclaratorKind, Expression, Initializer, NameKind, NodeKind, PointerKind,
};
use cdom_parser::Language;

use crate::common::{declarations, find, find_id_expression};
use crate::{assert_parses_ok, assert_parses_parameterized};

#[test]
fn constructor_initializer_with_arguments() {
    let unit = assert_parses_ok!(
        "class A { public: A(const char* s, int a, int b); };\nA a(\"hi\", 1, 2);",
        Language::Cpp
    );
    let init = find(&unit, |kind| {
        matches!(kind, NodeKind::Initializer(Initializer::Constructor { .. }))
    })
    .expect("constructor initializer");
    let NodeKind::Initializer(Initializer::Constructor { argument }) = unit.ast.kind(init) else {
        unreachable!()
    };
    assert_eq!(unit.ast.call_arguments(*argument).len(), 3);

    // The member declaration inside the class is a constructor, not a variable of type A
    let constructor = find(&unit, |kind| {
        matches!(kind, NodeKind::Declarator(d) if matches!(d.kind, DeclaratorKind::Function { .. }))
    })
    .expect("constructor declarator");
    assert_eq!(
        unit.ast.name_text(unit.ast.declarator_name(constructor)),
        "A"
    );
}

#[test]
fn empty_constructor_initializer() {
    let unit = assert_parses_ok!("struct B { B(); };\nB b();", Language::Cpp);
    // `B b()` declares a function
    let decls = declarations(&unit);
    let Some(Declaration::Simple { declarators, .. }) = unit.ast.declaration(decls[1]) else {
        panic!("expected a simple declaration");
    };
    assert!(matches!(
        unit.ast.declarator(declarators[0]).map(|d| &d.kind),
        Some(DeclaratorKind::Function { .. })
    ));
}

#[test]
fn user_defined_literal_keeps_suffix_apart() {
    let unit = assert_parses_ok!("int x = 42_km;", Language::Cpp);
    let literal = find(&unit, |kind| {
        matches!(kind, NodeKind::Expression(Expression::Literal(_)))
    })
    .expect("literal");
    let Some(Expression::Literal(literal)) = unit.ast.expression(literal) else {
        unreachable!()
    };
    assert_eq!(literal.value, "42");
    assert_eq!(literal.suffix.as_deref(), Some("_km"));
}

#[test]
fn literal_operator_name() {
    let unit = assert_parses_ok!(
        "unsigned long long operator\"\"_km(unsigned long long v);",
        Language::Cpp
    );
    let declarator = find(&unit, |kind| {
        matches!(kind, NodeKind::Declarator(d) if matches!(d.kind, DeclaratorKind::Function { .. }))
    })
    .expect("function declarator");
    let name = unit.ast.declarator_name(declarator);
    assert_eq!(unit.ast.name_text(name), "operator\"\"_km");
    assert!(matches!(
        unit.ast.name(name).map(|n| &n.kind),
        Some(NameKind::Operator)
    ));
}

#[test]
fn qualified_name_in_expression() {
    let unit = assert_parses_ok!("namespace ns { int v; }\nint w = ns::v;", Language::Cpp);
    let id = find(&unit, |kind| {
        matches!(kind, NodeKind::Expression(Expression::Id { .. }))
    })
    .expect("id expression");
    let Some(Expression::Id { name }) = unit.ast.expression(id) else {
        unreachable!()
    };
    assert_eq!(unit.ast.name_text(*name), "ns::v");
    let Some(NameKind::Qualified {
        segments,
        fully_qualified,
    }) = unit.ast.name(*name).map(|n| &n.kind)
    else {
        panic!("expected a qualified name");
    };
    assert_eq!(segments.len(), 2);
    assert!(!fully_qualified);
    assert_eq!(unit.ast.name_text(unit.ast.last_segment(*name)), "v");
}

#[test]
fn template_id_in_call() {
    let unit = assert_parses_ok!(
        "template <typename T> T max(T a, T b);\nint m = max<int>(1, 2);",
        Language::Cpp
    );
    let decls = declarations(&unit);
    assert!(matches!(
        unit.ast.declaration(decls[0]),
        Some(Declaration::Template { parameters, .. }) if parameters.len() == 1
    ));
    let template_name = find(&unit, |kind| {
        matches!(kind, NodeKind::Name(name) if matches!(name.kind, NameKind::TemplateId { .. }))
    })
    .expect("template id");
    let Some(NameKind::TemplateId { arguments, .. }) =
        unit.ast.name(template_name).map(|n| &n.kind)
    else {
        unreachable!()
    };
    assert_eq!(arguments.len(), 1);
    assert!(matches!(unit.ast.kind(arguments[0]), NodeKind::TypeId(_)));
    assert_eq!(unit.ast.name_text(template_name), "max");
}

#[test]
fn class_template_names_a_type_after_its_definition() {
    let unit = assert_parses_ok!(
        "template <typename T> struct S { T value; };\nS<int> s;\ntemplate <class T> class Fwd;\nFwd<int> *f;",
        Language::Cpp
    );
    let decls = declarations(&unit);
    assert_eq!(decls.len(), 4);
    let Some(Declaration::Simple { declarators, .. }) = unit.ast.declaration(decls[1]) else {
        panic!("`S<int> s;` is not a simple declaration");
    };
    assert_eq!(unit.ast.name_text(unit.ast.declarator_name(declarators[0])), "s");
    let template_name = find(&unit, |kind| {
        matches!(kind, NodeKind::Name(name) if matches!(name.kind, NameKind::TemplateId { .. }))
    })
    .expect("template id");
    assert_eq!(unit.ast.name_text(template_name), "S");
}

#[test]
fn using_directive_and_namespace() {
    let unit = assert_parses_ok!(
        "namespace a { int x; }\nusing namespace a;\nint y = x;",
        Language::Cpp
    );
    let decls = declarations(&unit);
    assert_eq!(decls.len(), 3);
    assert!(matches!(
        unit.ast.declaration(decls[0]),
        Some(Declaration::Namespace { declarations, .. }) if declarations.len() == 1
    ));
    assert!(matches!(
        unit.ast.declaration(decls[1]),
        Some(Declaration::UsingDirective { .. })
    ));
    assert!(find_id_expression(&unit, "x").is_some());
}

#[test]
fn operator_function_name() {
    let unit = assert_parses_ok!(
        "struct V { int x; };\nV operator+(V a, V b);",
        Language::Cpp
    );
    let declarator = find(&unit, |kind| {
        matches!(kind, NodeKind::Declarator(d) if matches!(d.kind, DeclaratorKind::Function { .. }))
    })
    .expect("operator declarator");
    assert_eq!(
        unit.ast.name_text(unit.ast.declarator_name(declarator)),
        "operator+"
    );
}

#[test]
fn reference_declarator() {
    let unit = assert_parses_ok!("int x;\nint& r = x;", Language::Cpp);
    let pointer = find(&unit, |kind| matches!(kind, NodeKind::PointerOperator(_)))
        .expect("reference operator");
    let NodeKind::PointerOperator(pointer) = unit.ast.kind(pointer) else {
        unreachable!()
    };
    assert_eq!(pointer.kind, PointerKind::Reference);
}

#[test]
fn out_of_class_member_definition() {
    let unit = assert_parses_ok!(
        "struct S { void f(); };\nvoid S::f() { }",
        Language::Cpp
    );
    let decls = declarations(&unit);
    let Some(Declaration::FunctionDefinition { declarator, .. }) = unit.ast.declaration(decls[1])
    else {
        panic!("expected a function definition");
    };
    assert_eq!(
        unit.ast.name_text(unit.ast.declarator_name(*declarator)),
        "S::f"
    );
}

#[test]
fn cpp_parameterized() {
    assert_parses_parameterized! {
        ok: [
            "class C { int m; public: int get(); };",
            "extern \"C\" { int puts(const char *s); }",
            "bool b = true; void *p = nullptr;",
            "namespace { int hidden; }",
            "template <class T, class U = int> struct Pair { T first; U second; };",
            "struct D { ~D(); };",
            "int v = ::global;",
        ],
        err: [
            "namespace ns { int v; ",
            "template <int N> int f();",
            "using namespace ;",
        ],
        language: Language::Cpp
    }
}
