#[test]
fn test_ambiguous_overload() {
    assert_problems!(
        Cpp,
        r#"
void h(long a);
void h(double a);
void call() { h(1); }"#,
        [(3, OverloadAmbiguous)]
    );
}

#[test]
fn test_best_overload_chosen() {
    assert_clean!(
        Cpp,
        r#"
void p(int a);
void p(double a);
void call() {
    p(1);
    p(1.0);
    p('c');
    p(1.5f);
}"#
    );
}

#[test]
fn test_default_arguments() {
    assert_problems!(
        Cpp,
        r#"
void k(int a, int b = 2);
void call() {
    k(1);
    k(1, 2);
    k();
    k(1, 2, 3);
}"#,
        [(5, InvalidArguments), (6, InvalidArguments)]
    );
}

#[test]
fn test_variadic_functions() {
    assert_problems!(
        C,
        r#"
int printf(const char *format, ...);
void call(void) {
    printf("%d %f", 1, 2.0);
    printf();
}"#,
        [(4, InvalidArguments)]
    );
}

#[test]
fn test_null_pointer_constants() {
    assert_problems!(
        Cpp,
        r#"
void q(int *p);
void call() {
    q(0);
    q(nullptr);
    q(1);
}"#,
        [(5, InvalidArguments)]
    );
}

#[test]
fn test_c_calls_with_wrong_arity() {
    assert_problems!(
        C,
        r#"
int area(int w, int h);
int call(void) { return area(1) + area(1, 2); }"#,
        [(2, InvalidArguments)]
    );
}

#[test]
fn test_converting_constructor() {
    assert_clean!(
        Cpp,
        r#"
struct Meters { Meters(double value); };
void walk(Meters distance);
void call() { walk(3.5); }"#
    );
}
