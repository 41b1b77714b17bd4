//! Runs the markdown tests under `mdtest/` through problem reporting.

use cdom_diagnostics::{DiagnosticSeverity, LineIndex};
use cdom_parser::{Language, SourceFile};
use cdom_semantic::problem_diagnostics;
use cdom_test_utils::mdtest::{discover_markdown_files, ExpectedProblem, MdLanguage, MdTest, MdTestRunner};

use crate::test_db;

fn report(test: &MdTest) -> Result<Vec<ExpectedProblem>, String> {
    let db = test_db();
    let language = match test.language {
        MdLanguage::C => Language::C,
        MdLanguage::Cpp => Language::Cpp,
    };
    let file = SourceFile::new(&db, test.source.clone(), test.file_name(), language);
    let diagnostics = problem_diagnostics(&db, file)
        .as_ref()
        .map_err(|e| e.to_string())?;
    let lines = LineIndex::new(&test.source);
    let settings = &test.config.mdtest;

    Ok(diagnostics
        .iter()
        .filter(|d| settings.check_warnings || d.severity == DiagnosticSeverity::Error)
        .filter(|d| settings.check_syntax || d.code.is_binding_problem())
        .map(|d| ExpectedProblem {
            line: d.to_marker(&lines).line,
            code: d.code.id().to_string(),
        })
        .collect())
}

#[test]
fn test_markdown_files() {
    let files = discover_markdown_files();
    assert!(!files.is_empty(), "no markdown tests found");

    let runner = MdTestRunner::new("binding", report);
    let mut failures = Vec::new();
    let mut count = 0;
    for file in &files {
        for outcome in runner.run_file(file) {
            count += 1;
            if !outcome.passed() {
                failures.push(outcome.to_string());
            }
        }
    }
    assert!(count > 0);
    assert!(
        failures.is_empty(),
        "{} of {count} markdown tests failed:\n{}",
        failures.len(),
        failures.join("\n")
    );
}
