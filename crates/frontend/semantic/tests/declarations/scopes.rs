#[test]
fn test_parameter_redeclared_in_body() {
    assert_problems!(
        C,
        r#"
int f(int a) {
    int a = 2;
    return a;
}"#,
        [(2, Redeclaration)]
    );
}

#[test]
fn test_duplicate_parameters() {
    assert_problems!(C, "int f(int a, int a) { return a; }", [(1, Redeclaration)]);
}

#[test]
fn test_block_local_duplicates() {
    assert_problems!(
        C,
        r#"
void f(void) {
    int i;
    int i;
}"#,
        [(3, Redeclaration)]
    );
}

#[test]
fn test_shadowing_in_nested_blocks() {
    assert_clean!(
        Cpp,
        r#"
int value = 0;
int f(int value) {
    {
        int value = 1;
        for (int value = 2; value < 3; ++value) {}
        return value;
    }
}"#
    );
}

#[test]
fn test_for_initializer_scope_ends_with_loop() {
    assert_problems!(
        Cpp,
        r#"
int f() {
    for (int i = 0; i < 3; i++) {}
    return i;
}"#,
        [(3, VariableResolutionFailure)]
    );
}

#[test]
fn test_use_before_declaration() {
    assert_problems!(
        C,
        r#"
int f(void) {
    int a = b;
    int b = 1;
    return a + b;
}"#,
        [(2, VariableResolutionFailure)]
    );
}
