use cdom_parser::{Language, SourceFile};
use cdom_semantic::{Binding, BindingKind, ProblemKind, SemanticModel};

use crate::{bind_snippet, test_db};

fn binding_named<'m>(model: &'m SemanticModel, name: &str) -> &'m Binding {
    model
        .bindings()
        .map(|(_, binding)| binding)
        .find(|binding| binding.name == name && !binding.kind.is_problem())
        .unwrap_or_else(|| panic!("no binding named {name}"))
}

#[test]
fn test_binding_is_idempotent() {
    let code = r#"
struct S { int a; };
int f(struct S *s) { return s->a + s->b; }
int g(void) { return f(0) + h(); }"#;
    let (unit, first) = bind_snippet(Language::C, code, None);
    let second = cdom_semantic::bind_unit(&unit, None);
    assert_eq!(first, second);
    assert_eq!(first.problems().len(), 2);
}

#[test]
fn test_query_matches_direct_binding() {
    let code = "int f(void) { return g(); }";
    let db = test_db();
    let file = SourceFile::new(&db, code.to_string(), "snippet.c".to_string(), Language::C);
    let queried = cdom_semantic::semantic_model(&db, file).as_ref().unwrap().clone();
    let (_, direct) = bind_snippet(Language::C, code, None);
    assert_eq!(*queried, direct);
    assert_eq!(queried.problems().len(), 1);
}

#[test]
fn test_enumerator_values() {
    let (_, model) = bind_snippet(Language::C, "enum { A = 2, B, C = A + 5, D };", None);
    let value = |name: &str| match binding_named(&model, name).kind {
        BindingKind::Enumerator { value, .. } => value,
        _ => panic!("{name} is not an enumerator"),
    };
    assert_eq!(value("A"), Some(2));
    assert_eq!(value("B"), Some(3));
    assert_eq!(value("C"), Some(7));
    assert_eq!(value("D"), Some(8));
}

#[test]
fn test_auto_types() {
    let code = r#"
struct P { int x; };
P make();
auto a = 1 + 2.0;
auto b = make();
auto c = &b;
auto d = 'x';
auto e = "text";"#;
    let (_, model) = bind_snippet(Language::Cpp, code, None);
    let type_of = |name: &str| binding_named(&model, name).ty.to_string();
    assert_eq!(type_of("a"), "double");
    assert_eq!(type_of("b"), "struct P");
    assert_eq!(type_of("c"), "struct P *");
    assert_eq!(type_of("d"), "char");
    assert_eq!(type_of("e"), "const char *");
}

#[test]
fn test_qualified_names() {
    let code = r#"
namespace outer {
    namespace inner { int deep; }
    struct Box { int size(); };
}"#;
    let (_, model) = bind_snippet(Language::Cpp, code, None);
    assert_eq!(binding_named(&model, "deep").qualified_name, "outer::inner::deep");
    assert_eq!(binding_named(&model, "size").qualified_name, "outer::Box::size");
    assert_eq!(binding_named(&model, "size").signature(), "int outer::Box::size()");
}

#[test]
fn test_problem_candidates() {
    let code = r#"
void h(long a);
void h(double a);
void call() { h(1); }"#;
    let (_, model) = bind_snippet(Language::Cpp, code, None);
    let problems = model.problems();
    assert_eq!(problems.len(), 1);
    let (_, problem) = problems[0];
    assert_eq!(problem.kind, ProblemKind::OverloadAmbiguous);
    assert_eq!(problem.name, "h");
    let signatures: Vec<String> = problem
        .candidates
        .iter()
        .map(|&id| model.binding(id).signature())
        .collect();
    assert_eq!(signatures, vec!["void h(long)", "void h(double)"]);
}

#[test]
fn test_macros_are_recorded() {
    let code = r#"
#define LIMIT 10
#define SQUARE(x) ((x) * (x))
int f(void) { return SQUARE(LIMIT); }"#;
    let (_, model) = bind_snippet(Language::C, code, None);
    let macros: Vec<(&str, bool)> = model
        .macros()
        .iter()
        .map(|&id| {
            let binding = model.binding(id);
            match binding.kind {
                BindingKind::Macro { function_like } => (binding.name.as_str(), function_like),
                _ => panic!("not a macro"),
            }
        })
        .collect();
    assert_eq!(macros, vec![("LIMIT", false), ("SQUARE", true)]);
    assert!(model.problems().is_empty());
}
