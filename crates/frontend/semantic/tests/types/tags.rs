#[test]
fn test_unknown_enum_tag() {
    assert_problems!(
        C,
        r#"
enum mode { READ, WRITE };
enum mode current;
enum flags options;"#,
        [(3, TypeResolutionFailure)]
    );
}

#[test]
fn test_unknown_struct_tag_declares_incomplete_type() {
    assert_clean!(
        C,
        r#"
struct opaque *handle;
struct opaque *get(void) { return handle; }"#
    );
}

#[test]
fn test_anonymous_struct_through_typedef() {
    assert_clean!(
        C,
        r#"
typedef struct { int x; int y; } point;
point origin;
int manhattan(point *p) { return p->x + p->y + origin.x; }"#
    );
}

#[test]
fn test_tags_are_types_in_cpp() {
    assert_clean!(
        Cpp,
        r#"
struct Node { Node *next; };
enum Color { Red, Green };
Node head;
Color paint = Green;
int f() { return head.next == nullptr && paint == Red; }"#
    );
}

#[test]
fn test_enumerators_in_expressions() {
    assert_problems!(
        C,
        r#"
enum level { LOW = 1, MID, HIGH = MID * 2 };
int weight(void) { return LOW + MID + HIGH + EXTREME; }"#,
        [(2, VariableResolutionFailure)]
    );
}

#[test]
fn test_sizeof_and_casts() {
    assert_clean!(
        C,
        r#"
typedef unsigned long size_t;
struct item { int id; };
size_t bytes(struct item *it) { return sizeof(struct item) + (size_t)it->id; }"#
    );
}
