#[test]
fn test_nonexistent_literal_operator() {
    assert_problems!(Cpp, "auto d = 42_waldo;", [(1, FunctionResolutionFailure)]);
}

#[test]
fn test_literal_operator_with_wrong_type() {
    assert_problems!(
        Cpp,
        r#"
struct R {};
R operator "" _waldo(const char*, unsigned long);  // expects a string literal
auto d = 42_waldo;                                 // passing an integer"#,
        [(3, InvalidArguments)]
    );
}

#[test]
fn test_literal_operators_by_category() {
    assert_clean!(
        Cpp,
        r#"
struct Distance {};
Distance operator "" _km(unsigned long long);
Distance operator "" _km(long double);
Distance operator "" _tag(const char*, unsigned long);
auto a = 42_km;
auto b = 4.2_km;
auto c = "label"_tag;"#
    );
}
