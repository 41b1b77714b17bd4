use std::fmt;

use serde::{Deserialize, Serialize};

/// Source dialect of a translation unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    C,
    #[serde(alias = "c++", alias = "cxx")]
    Cpp,
}

impl Language {
    /// Guess the dialect from a file extension, defaulting to C
    pub fn from_path(path: &str) -> Self {
        match path.rsplit_once('.').map(|(_, ext)| ext) {
            Some("cpp" | "cc" | "cxx" | "hpp" | "hh" | "hxx" | "C") => Self::Cpp,
            _ => Self::C,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::C => write!(f, "C99"),
            Self::Cpp => write!(f, "C++"),
        }
    }
}

/// Options for one parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    pub language: Language,
    /// Number of reductions between two cancellation checks
    pub cancellation_check_interval: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            language: Language::C,
            cancellation_check_interval: 256,
        }
    }
}

impl ParserOptions {
    pub fn for_language(language: Language) -> Self {
        Self {
            language,
            ..Self::default()
        }
    }
}
