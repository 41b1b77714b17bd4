use super::config::ExpectedProblem;
use super::parser::{extract_tests, MdTest};
use std::fmt;
use std::path::Path;

type ProcessorType<'a> = Box<dyn Fn(&MdTest) -> Result<Vec<ExpectedProblem>, String> + 'a>;

/// Runs markdown tests through a front-end phase and compares the problems
/// it reports against the `// error:` annotations
pub struct MdTestRunner<'a> {
    /// Name of the phase under test (e.g. "binding")
    pub phase_name: &'a str,
    /// Reports `(line, code)` for every problem found in a test's source
    pub processor: ProcessorType<'a>,
}

impl<'a> MdTestRunner<'a> {
    pub fn new(
        phase_name: &'a str,
        processor: impl Fn(&MdTest) -> Result<Vec<ExpectedProblem>, String> + 'a,
    ) -> Self {
        Self {
            phase_name,
            processor: Box::new(processor),
        }
    }

    /// Runs every test in a markdown file, skipping ignored ones
    pub fn run_file(&self, path: &Path) -> Vec<TestOutcome> {
        let tests = match extract_tests(path) {
            Ok(tests) => tests,
            Err(e) => {
                panic!("Failed to parse markdown file {}: {}", path.display(), e);
            }
        };

        tests
            .into_iter()
            .filter(|test| test.metadata.ignore.is_none())
            .map(|test| self.run_test(&test))
            .collect()
    }

    pub fn run_test(&self, test: &MdTest) -> TestOutcome {
        let mut reported = match (self.processor)(test) {
            Ok(reported) => reported,
            Err(error) => {
                return TestOutcome {
                    name: test.name.clone(),
                    location: format!("{}:{}", test.location.file, test.location.line),
                    phase: self.phase_name.to_string(),
                    missing: Vec::new(),
                    unexpected: Vec::new(),
                    failure: Some(error),
                };
            }
        };
        reported.sort();

        let mut expected = test.metadata.expected.clone();
        let mut unexpected = Vec::new();
        for problem in reported {
            match expected.iter().position(|e| *e == problem) {
                Some(index) => {
                    expected.remove(index);
                }
                None => unexpected.push(problem),
            }
        }

        TestOutcome {
            name: test.name.clone(),
            location: format!("{}:{}", test.location.file, test.location.line),
            phase: self.phase_name.to_string(),
            missing: expected,
            unexpected,
            failure: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TestOutcome {
    pub name: String,
    /// Markdown file and line of the code block
    pub location: String,
    pub phase: String,
    /// Annotated but not reported
    pub missing: Vec<ExpectedProblem>,
    /// Reported but not annotated
    pub unexpected: Vec<ExpectedProblem>,
    /// The phase itself failed
    pub failure: Option<String>,
}

impl TestOutcome {
    pub fn passed(&self) -> bool {
        self.failure.is_none() && self.missing.is_empty() && self.unexpected.is_empty()
    }
}

impl fmt::Display for TestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) [{}]", self.name, self.location, self.phase)?;
        if let Some(failure) = &self.failure {
            write!(f, "\n  failed: {failure}")?;
        }
        for problem in &self.missing {
            write!(f, "\n  missing {} on line {}", problem.code, problem.line)?;
        }
        for problem in &self.unexpected {
            write!(f, "\n  unexpected {} on line {}", problem.code, problem.line)?;
        }
        Ok(())
    }
}
