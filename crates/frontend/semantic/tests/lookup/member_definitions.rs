#[test]
fn test_out_of_class_definitions() {
    assert_problems!(
        Cpp,
        r#"
struct S {
    void f();
    static int count;
};
void S::f() {}
int S::count = 0;
void S::g() {}
void S::f() {}"#,
        [(7, MemberNotFound), (8, Redeclaration)]
    );
}

#[test]
fn test_member_definition_sees_class_members() {
    assert_clean!(
        Cpp,
        r#"
class Counter {
public:
    int next();
private:
    int value;
};
int Counter::next() { return value++; }"#
    );
}

#[test]
fn test_member_definition_needs_matching_parameters() {
    assert_problems!(
        Cpp,
        r#"
struct Shape {
    double area(double scale);
};
double Shape::area(int scale) { return scale; }"#,
        [(4, MemberNotFound)]
    );
}

#[test]
fn test_namespace_member_definitions() {
    assert_clean!(
        Cpp,
        r#"
namespace geometry {
    struct Point { int x; int norm(); };
}
int geometry::Point::norm() { return x * x; }"#
    );
}
