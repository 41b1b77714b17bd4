//! # Macro Expansion Tests
//!
//! Problems in expanded code are reported against the text the user wrote:
//! macro arguments where they appear, everything else at the outermost
//! invocation.

use cdom_diagnostics::DiagnosticCode;
use cdom_parser::Language;

use crate::{marker_on_line, markers_for};

#[test]
fn test_dont_underline_whole_macro() {
    let code = r#"
#define MACRO(code) code
int main() {
  MACRO(foo());
  return 0;
}"#;
    assert_problems!(Cpp, code, [(3, FunctionResolutionFailure)]);

    let markers = markers_for(Language::Cpp, code, stdext::function_name!());
    let marker = marker_on_line(&markers, 3, DiagnosticCode::FunctionResolutionFailure);
    assert!(!marker.message.contains("MACRO"));
    // Clipped to the argument text, `foo()` starts in column 9
    assert_eq!(marker.columns.start, 9);
}

#[test]
fn test_object_like_macro_body() {
    let code = r#"
#define BAD undefined_name
int f() { return BAD; }"#;
    let markers = markers_for(Language::C, code, stdext::function_name!());
    insta::assert_snapshot!(markers[0].to_string(), @"test_object_like_macro_body.c:2:18: error[variable-resolution-failure]: Symbol 'undefined_name' could not be resolved");
    assert_eq!(markers[0].columns, 18..21);
}

#[test]
fn test_nested_expansion_blames_outer_invocation() {
    let code = r#"
#define INNER(x) ((x) + missing)
#define OUTER(y) INNER(y)
int f(int a) {
    return OUTER(a);
}"#;
    assert_problems!(C, code, [(4, VariableResolutionFailure)]);

    let markers = markers_for(Language::C, code, stdext::function_name!());
    assert_eq!(markers[0].columns.start, 12);
}

#[test]
fn test_macros_expanding_to_declarations() {
    assert_clean!(
        C,
        r#"
#define DECLARE(type, name) type name = 0
#define ADD(a, b) ((a) + (b))
DECLARE(int, total);
int sum(int x) { return ADD(total, x); }"#
    );
}

#[test]
fn test_conditional_compilation_hides_errors() {
    assert_clean!(
        C,
        r#"
#define FEATURE 0
#if FEATURE
int broken(void) { return missing; }
#endif
int ok(void) { return FEATURE; }"#
    );
}
