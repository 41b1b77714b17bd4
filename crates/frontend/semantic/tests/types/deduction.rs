#[test]
fn test_self_referencing_auto() {
    assert_problems!(Cpp, "auto x = x;", [(1, CircularReference)]);
}

#[test]
fn test_auto_deduces_from_initializer() {
    assert_clean!(
        Cpp,
        r#"
struct Pair { int first; int second; };
Pair make();
auto p = make();
auto q = &p;
int sum() { return p.first + q->second; }"#
    );
}

#[test]
fn test_auto_member_access_on_unknown_member() {
    assert_problems!(
        Cpp,
        r#"
struct Pair { int first; };
Pair make();
auto p = make();
int third() { return p.third; }"#,
        [(4, FieldResolutionFailure)]
    );
}

#[test]
fn test_this_in_methods() {
    assert_problems!(
        Cpp,
        r#"
struct Account {
    int balance;
    int get() { return this->balance + this->interest; }
};"#,
        [(3, FieldResolutionFailure)]
    );
}
