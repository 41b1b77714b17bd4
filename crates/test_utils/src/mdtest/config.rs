use serde::{Deserialize, Serialize};

/// Settings from a ```toml block; they apply to every later test in the file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MdTestConfig {
    #[serde(default)]
    pub mdtest: MdTestSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MdTestSection {
    /// Whether warnings (e.g. malformed directives) must be annotated too
    #[serde(rename = "check-warnings", default)]
    pub check_warnings: bool,
    /// Whether syntax errors must be annotated too
    #[serde(rename = "check-syntax", default = "default_check_syntax")]
    pub check_syntax: bool,
}

impl Default for MdTestSection {
    fn default() -> Self {
        Self {
            check_warnings: false,
            check_syntax: default_check_syntax(),
        }
    }
}

const fn default_check_syntax() -> bool {
    true
}

/// A problem a test expects, written as `// error: <code>` on its line
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExpectedProblem {
    /// 1-based line within the code block
    pub line: usize,
    /// Stable diagnostic code identifier, e.g. `field-resolution-failure`
    pub code: String,
}

#[derive(Debug, Clone, Default)]
pub struct TestMetadata {
    pub expected: Vec<ExpectedProblem>,
    pub tags: Vec<String>,
    pub ignore: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Location {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub const fn new(file: String, line: usize, column: usize) -> Self {
        Self { file, line, column }
    }
}
