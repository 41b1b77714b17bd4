//! Common test utilities for binding tests
//!
//! - Test database setup
//! - Running a snippet through `problem_diagnostics`
//! - Problem assertions with rendered reports on failure

use cdom_diagnostics::{build_diagnostic_message, Diagnostic, DiagnosticCode, LineIndex, Marker};
use cdom_parser::{
    parse_translation_unit, CancellationToken, Language, ParsedUnit, ParserDb, ParserOptions,
    SourceFile, Upcast,
};
use cdom_semantic::{bind_unit, problem_diagnostics, CrossFileIndex, ProblemKind, SemanticDb, SemanticModel};

// ===== Test Database Setup =====

#[salsa::db]
#[derive(Clone, Default)]
pub struct TestDb {
    storage: salsa::Storage<Self>,
}

#[salsa::db]
impl salsa::Database for TestDb {}
#[salsa::db]
impl ParserDb for TestDb {}
#[salsa::db]
impl SemanticDb for TestDb {}

impl Upcast<dyn ParserDb> for TestDb {
    fn upcast(&self) -> &(dyn ParserDb + 'static) {
        self
    }
    fn upcast_mut(&mut self) -> &mut (dyn ParserDb + 'static) {
        self
    }
}

pub fn test_db() -> TestDb {
    TestDb::default()
}

// ===== Snippets =====

/// Drops the newline that opens a raw string literal, so line 1 is the
/// first line of code
pub fn snippet(code: &str) -> &str {
    code.strip_prefix('\n').unwrap_or(code)
}

/// A file name derived from the calling test
pub fn file_name_for(test_name: &str, language: Language) -> String {
    let stem = test_name
        .rsplit("::")
        .find(|segment| !segment.is_empty() && *segment != "{{closure}}")
        .unwrap_or("snippet");
    match language {
        Language::C => format!("{stem}.c"),
        Language::Cpp => format!("{stem}.cpp"),
    }
}

pub fn parse_snippet(language: Language, code: &str, file_name: &str) -> ParsedUnit {
    parse_translation_unit(
        snippet(code),
        file_name,
        &ParserOptions::for_language(language),
        &CancellationToken::new(),
    )
    .unwrap_or_else(|e| panic!("{file_name} failed to parse: {e}"))
}

/// Binds a snippet outside any database
pub fn bind_snippet(language: Language, code: &str, index: Option<&dyn CrossFileIndex>) -> (ParsedUnit, SemanticModel) {
    let unit = parse_snippet(language, code, &file_name_for("snippet", language));
    let model = bind_unit(&unit, index);
    (unit, model)
}

/// All diagnostics for a snippet, through the salsa queries
pub fn diagnostics_for(language: Language, code: &str, test_name: &str) -> Vec<Diagnostic> {
    let db = test_db();
    let file = SourceFile::new(
        &db,
        snippet(code).to_string(),
        file_name_for(test_name, language),
        language,
    );
    problem_diagnostics(&db, file)
        .clone()
        .unwrap_or_else(|e| panic!("{test_name} failed to parse: {e}"))
}

pub fn markers_for(language: Language, code: &str, test_name: &str) -> Vec<Marker> {
    let lines = LineIndex::new(snippet(code));
    diagnostics_for(language, code, test_name)
        .iter()
        .map(|diagnostic| diagnostic.to_marker(&lines))
        .collect()
}

pub fn render(code: &str, diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|diagnostic| build_diagnostic_message(snippet(code), diagnostic, false))
        .collect::<Vec<_>>()
        .join("\n")
}

// ===== Assertions =====

/// Asserts the snippet reports exactly `expected` as `(line, kind)` pairs;
/// syntax errors always count as unexpected
pub fn assert_problems_impl(language: Language, code: &str, expected: &[(usize, ProblemKind)], test_name: &str) {
    let diagnostics = diagnostics_for(language, code, test_name);
    let lines = LineIndex::new(snippet(code));

    let mut actual: Vec<(usize, DiagnosticCode)> = diagnostics
        .iter()
        .map(|diagnostic| (diagnostic.to_marker(&lines).line, diagnostic.code))
        .collect();
    actual.sort();
    let mut wanted: Vec<(usize, DiagnosticCode)> = expected.iter().map(|&(line, kind)| (line, kind.code())).collect();
    wanted.sort();

    if actual != wanted {
        let format_list = |list: &[(usize, DiagnosticCode)]| {
            list.iter()
                .map(|(line, code)| format!("  line {line}: {code}"))
                .collect::<Vec<_>>()
                .join("\n")
        };
        panic!(
            "{test_name}: problems differ\nexpected:\n{}\nactual:\n{}\n\n{}",
            format_list(&wanted),
            format_list(&actual),
            render(code, &diagnostics)
        );
    }
}

/// The first diagnostic with `code` on `line`; panics if there is none
pub fn marker_on_line(markers: &[Marker], line: usize, code: DiagnosticCode) -> Marker {
    markers
        .iter()
        .find(|marker| marker.line == line && marker.code == code)
        .cloned()
        .unwrap_or_else(|| panic!("no {code} marker on line {line}; markers: {markers:#?}"))
}
