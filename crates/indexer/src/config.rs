//! `cdom.toml` loading.
//!
//! ```toml
//! language = "cpp"
//! jobs = 4
//! cancellation_check_interval = 128
//!
//! [diagnostics]
//! color = false
//! ```
//!
//! Every key is optional. Command-line flags override file values.

use std::path::{Path, PathBuf};

use cdom_parser::{Language, ParserOptions};
use serde::{Deserialize, Serialize};

/// Name of the configuration file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "cdom.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexerConfig {
    /// Dialect for every input; guessed from each file's extension when unset
    pub language: Option<Language>,
    /// Worker threads, 0 lets rayon decide
    pub jobs: usize,
    pub cancellation_check_interval: usize,
    pub diagnostics: DiagnosticsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiagnosticsConfig {
    pub color: bool,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            language: None,
            jobs: 0,
            cancellation_check_interval: ParserOptions::default().cancellation_check_interval,
            diagnostics: DiagnosticsConfig::default(),
        }
    }
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

impl IndexerConfig {
    /// Load a configuration file
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| {
            tracing::error!("Failed to read {}: {}", path.display(), source);
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| {
            tracing::error!("Failed to parse TOML: {}", e);
            e
        })?;
        Ok(config)
    }

    /// `cdom.toml` in `dir` if there is one, the defaults otherwise
    pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "loading configuration");
            Self::from_path(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Parser options for one input file
    pub fn parser_options(&self, file_path: &str) -> ParserOptions {
        ParserOptions {
            language: self.language.unwrap_or_else(|| Language::from_path(file_path)),
            cancellation_check_interval: self.cancellation_check_interval.max(1),
        }
    }
}
