#[test]
fn test_goto_missing_label() {
    assert_problems!(
        C,
        r#"
void f(void) {
    goto done;
    goto missing;
done:
    return;
}"#,
        [(3, LabelNotFound)]
    );
}

#[test]
fn test_duplicate_label() {
    assert_problems!(
        C,
        r#"
void g(void) {
again:
    ;
again:
    goto again;
}"#,
        [(4, Redeclaration)]
    );
}

#[test]
fn test_labels_are_function_wide() {
    assert_clean!(
        C,
        r#"
int h(int n) {
    if (n) {
        goto nested;
    }
    {
nested:
        n++;
    }
    return n;
}"#
    );
}

#[test]
fn test_labels_do_not_cross_functions() {
    assert_problems!(
        C,
        r#"
void first(void) { here: ; }
void second(void) { goto here; }"#,
        [(2, LabelNotFound)]
    );
}

#[test]
fn test_labels_do_not_clash_with_variables() {
    assert_clean!(
        C,
        r#"
void f(void) {
    int out = 0;
out:
    if (out++ < 3) goto out;
}"#
    );
}
