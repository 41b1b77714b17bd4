#[test]
fn test_tentative_definitions_merge() {
    assert_clean!(
        C,
        r#"
int counter;
int counter;
extern int counter;
int counter = 3;"#
    );
}

#[test]
fn test_variable_initialized_twice() {
    assert_problems!(
        C,
        r#"
int counter = 1;
int counter = 2;"#,
        [(2, Redeclaration)]
    );
}

#[test]
fn test_variable_with_other_type() {
    assert_problems!(
        C,
        r#"
int value;
float value;"#,
        [(2, Redefinition)]
    );
}

#[test]
fn test_function_defined_twice() {
    assert_problems!(
        C,
        r#"
int twice(void) { return 1; }
int twice(void) { return 2; }"#,
        [(2, Redeclaration)]
    );
}

#[test]
fn test_function_return_type_mismatch() {
    assert_problems!(
        C,
        r#"
int f(int a);
double f(int a);"#,
        [(2, Redefinition)]
    );
}

#[test]
fn test_prototype_then_definition() {
    assert_clean!(
        C,
        r#"
int add(int a, int b);
int add(int, int);
int add(int a, int b) { return a + b; }"#
    );
}

#[test]
fn test_overloads_by_dialect() {
    let code = r#"
int g(int a);
int g(double a);"#;
    assert_problems!(C, code, [(2, Redefinition)]);
    assert_clean!(Cpp, code);
}

#[test]
fn test_typedef_redefinitions() {
    assert_clean!(
        C,
        r#"
typedef unsigned long size;
typedef unsigned long size;"#
    );
    assert_problems!(
        C,
        r#"
typedef int handle;
typedef float handle;"#,
        [(2, Redefinition)]
    );
}

#[test]
fn test_composite_redefinitions() {
    assert_problems!(
        C,
        r#"
struct S { int a; };
struct S { int b; };
struct T { int a; };
union T { int b; };"#,
        [(2, Redeclaration), (4, Redefinition)]
    );
}

#[test]
fn test_forward_declaration_completed() {
    assert_clean!(
        C,
        r#"
struct list;
struct list *head;
struct list { struct list *next; };
int empty(void) { return head->next == 0; }"#
    );
}

#[test]
fn test_enumerator_redeclared() {
    assert_problems!(
        C,
        r#"
enum color { RED, GREEN };
enum light { AMBER, RED };"#,
        [(2, Redeclaration)]
    );
}
