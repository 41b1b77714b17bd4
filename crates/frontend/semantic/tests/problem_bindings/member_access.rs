use cdom_diagnostics::DiagnosticCode;
use cdom_parser::Language;

use crate::{marker_on_line, markers_for};

#[test]
fn test_field_in_function_call() {
    assert_problems!(
        Cpp,
        r#"
int main () {
    struct X {} x;
    fun(x.y);
}"#,
        [(3, FieldResolutionFailure), (3, FunctionResolutionFailure)]
    );
}

#[test]
fn test_various_field_method_combinations() {
    assert_problems!(
        Cpp,
        r#"
int main () {
  struct X {} x;
  x.b(
      x.y(),
      x.y(
          x.y),
      x.y(
          x.y(
              a,
              fun(
                  x.b(),
                  x.y,
                  a.b()))));
}"#,
        [
            (3, MethodResolutionFailure),
            (4, MethodResolutionFailure),
            (5, MethodResolutionFailure),
            (6, FieldResolutionFailure),
            (7, MethodResolutionFailure),
            (8, MethodResolutionFailure),
            (9, VariableResolutionFailure),
            (10, FunctionResolutionFailure),
            (11, MethodResolutionFailure),
            (12, FieldResolutionFailure),
            (13, VariableResolutionFailure),
            (13, MethodResolutionFailure),
        ]
    );
}

#[test]
fn test_declared_members_resolve() {
    assert_clean!(
        Cpp,
        r#"
struct Point {
    int x;
    int y;
    int sum() { return x + y; }
};
int main() {
    Point p;
    Point *q = &p;
    return p.x + q->y + p.sum();
}"#
    );
}

#[test]
fn test_c_struct_fields() {
    assert_problems!(
        C,
        r#"
struct S { int a; };
int f(void) {
    struct S s;
    return s.a + s.b;
}"#,
        [(4, FieldResolutionFailure)]
    );
}

#[test]
fn test_arrow_on_pointer_to_struct() {
    assert_problems!(
        C,
        r#"
struct node { struct node *next; int value; };
int last(struct node *n) {
    while (n->next) n = n->next;
    return n->val;
}"#,
        [(4, FieldResolutionFailure)]
    );
}

#[test]
fn test_implicit_constructor_call() {
    assert_problems!(
        Cpp,
        r#"
struct A {
  A(int x, int y);
};

void test() {
  A a("hi", 1, 2);
}"#,
        [(6, InvalidArguments)]
    );
}

#[test]
fn test_implicit_constructor_rejects_arguments() {
    assert_problems!(
        Cpp,
        r#"
struct B { int v; };
void test() {
  B first;
  B third(1, 2);
}"#,
        [(4, InvalidArguments)]
    );
}

#[test]
fn test_candidates_listed_in_message() {
    let code = r#"
void take(int a, int b);
void take(const char *s);
void call() { take(1); }"#;
    let markers = markers_for(Language::Cpp, code, stdext::function_name!());
    let marker = marker_on_line(&markers, 3, DiagnosticCode::InvalidArguments);
    assert!(marker.message.starts_with("Invalid arguments 'take'"));
    assert!(marker.message.contains("Candidates are:"));
    assert!(marker.message.contains("take(int, int)"));
    assert!(marker.message.contains("take(const char *)"));
}
