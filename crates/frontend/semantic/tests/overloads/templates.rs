#[test]
fn test_conflicting_deduction() {
    assert_problems!(
        Cpp,
        r#"
template <typename T> T max(T a, T b) { return a > b ? a : b; }
int first = max(1, 2);
double second = max(1, 2.0);
double third = max<double>(1, 2.0);"#,
        [(3, InvalidTemplateArguments)]
    );
}

#[test]
fn test_class_template_arguments() {
    assert_problems!(
        Cpp,
        r#"
template <typename T> struct Box { T value; };
Box<int> fits;
Box<int, int> too_many;"#,
        [(3, InvalidTemplateArguments)]
    );
}

#[test]
fn test_default_template_arguments() {
    assert_clean!(
        Cpp,
        r#"
template <typename K, typename V = int> struct Pair { K key; V value; };
Pair<char> a;
Pair<char, double> b;"#
    );
}

#[test]
fn test_explicit_arguments_next_to_plain_functions() {
    assert_clean!(
        Cpp,
        r#"
template <typename T> T identity(T v) { return v; }
int plain(int v);
int a = identity<int>(1);
int b = plain(1);"#
    );
}

#[test]
fn test_members_of_dependent_types() {
    assert_clean!(
        Cpp,
        r#"
template <typename T> int size_of(T container) { return container.size() + container.length; }"#
    );
}
