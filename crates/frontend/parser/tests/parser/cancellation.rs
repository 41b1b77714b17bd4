//! Cooperative cancellation and the salsa entry point

use std::sync::Arc;

use cdom_parser::{
    parse_file, parse_translation_unit, CancellationToken, Language, ParseError, ParserOptions,
    SourceFile, Upcast,
};

use crate::common::test_db;

const SOURCE: &str = "int a; int b; void f(void) { a = b; }";

#[test]
fn cancelled_before_start() {
    let token = CancellationToken::new();
    token.cancel();
    let result = parse_translation_unit(
        SOURCE,
        "test.c",
        &ParserOptions::for_language(Language::C),
        &token,
    );
    assert_eq!(result, Err(ParseError::Cancelled));
}

#[test]
fn cancellation_is_polled_between_reductions() {
    let token = CancellationToken::new();
    let options = ParserOptions {
        language: Language::Cpp,
        cancellation_check_interval: 1,
    };
    token.cancel();
    let result = parse_translation_unit("namespace n { int a; int b; }", "test.cpp", &options, &token);
    assert_eq!(result, Err(ParseError::Cancelled));
}

#[test]
fn uncancelled_clone_lets_the_parse_finish() {
    let token = CancellationToken::new();
    let shared = token.clone();
    let unit = parse_translation_unit(
        SOURCE,
        "test.c",
        &ParserOptions::default(),
        &shared,
    )
    .unwrap();
    assert!(unit.problems().is_empty());
    token.cancel();
    assert!(shared.is_cancelled());
}

#[test]
fn parse_file_query_through_upcast() {
    let db = test_db();
    let file = SourceFile::new(
        &db,
        "class A {};\nA a;".to_string(),
        "a.cpp".to_string(),
        Language::Cpp,
    );
    let parser_db = db.upcast();
    let unit = parse_file(parser_db, file).as_ref().unwrap().clone();
    assert_eq!(unit.language, Language::Cpp);
    assert!(unit.problems().is_empty());

    let again = parse_file(parser_db, file).as_ref().unwrap().clone();
    assert!(Arc::ptr_eq(&unit, &again));
}

#[test]
fn parses_run_in_parallel_threads() {
    let handles: Vec<_> = (0..4)
        .map(|i| {
            std::thread::spawn(move || {
                let source = format!("int v{i}; int f{i}(void) {{ return v{i}; }}");
                parse_translation_unit(
                    &source,
                    "t.c",
                    &ParserOptions::default(),
                    &CancellationToken::new(),
                )
                .map(|unit| unit.ast.len())
            })
        })
        .collect();
    let sizes: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().unwrap().unwrap())
        .collect();
    assert!(sizes.windows(2).all(|w| w[0] == w[1]));
}
