#[test]
fn test_ambiguous_through_using_directives() {
    assert_problems!(
        Cpp,
        r#"
namespace a { int x; }
namespace b { int x; }
using namespace a;
using namespace b;
int f() { return x; }
int g() { return a::x + b::x; }"#,
        [(5, AmbiguousReference)]
    );
}

#[test]
fn test_unknown_qualifier() {
    assert_problems!(
        Cpp,
        r#"
namespace a { int x; }
int f() { return c::x + a::y; }"#,
        [(2, TypeResolutionFailure), (2, VariableResolutionFailure)]
    );
}

#[test]
fn test_reopened_and_anonymous_namespaces() {
    assert_clean!(
        Cpp,
        r#"
namespace n { int a = 1; }
namespace n { int b = a; }
namespace { int hidden = 2; }
namespace outer { namespace inner { int deep; } }
int f() { return n::a + n::b + hidden + outer::inner::deep + ::n::a; }"#
    );
}

#[test]
fn test_using_directive_in_block() {
    assert_problems!(
        Cpp,
        r#"
namespace tools { int level; }
int f() {
    using namespace tools;
    return level;
}
int g() { return level; }"#,
        [(6, VariableResolutionFailure)]
    );
}
