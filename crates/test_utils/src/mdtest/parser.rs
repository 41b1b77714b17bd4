use crate::mdtest::config::{ExpectedProblem, Location, MdTestConfig, TestMetadata};
use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag, TagEnd};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML config: {0}")]
    TomlError(#[from] toml::de::Error),
    #[error("Invalid test annotation at line {line}: {message}")]
    InvalidAnnotation { line: usize, message: String },
}

/// Dialect of a test's code block, from its fence tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MdLanguage {
    C,
    Cpp,
}

impl MdLanguage {
    fn from_fence(tag: &str) -> Option<Self> {
        match tag.split_whitespace().next()? {
            "c" => Some(Self::C),
            "cpp" | "c++" => Some(Self::Cpp),
            _ => None,
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            Self::C => "c",
            Self::Cpp => "cpp",
        }
    }
}

#[derive(Debug, Clone)]
pub struct MdTest {
    pub name: String,
    pub source: String,
    pub language: MdLanguage,
    pub metadata: TestMetadata,
    pub location: Location,
    pub config: MdTestConfig,
}

impl MdTest {
    /// File name the test is parsed under
    pub fn file_name(&self) -> String {
        format!("{}.{}", sanitize_test_name(&self.name), self.language.extension())
    }
}

/// Extracts one test per ```c / ```cpp block, named after the enclosing headings
pub fn extract_tests(markdown_path: &Path) -> Result<Vec<MdTest>, ParseError> {
    let content = std::fs::read_to_string(markdown_path)?;
    extract_tests_from_str(&content, &markdown_path.to_string_lossy())
}

pub fn extract_tests_from_str(content: &str, file: &str) -> Result<Vec<MdTest>, ParseError> {
    let mut tests = Vec::new();

    let mut current_h1 = String::new();
    let mut current_h2 = String::new();
    let mut current_config = MdTestConfig::default();

    let mut in_heading = false;
    let mut heading_level = 0;
    let mut in_code_block = false;
    let mut code_block_lang = String::new();
    let mut code_block_content = String::new();
    let mut block_start = 0;

    for (event, range) in Parser::new(content).into_offset_iter() {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                in_heading = true;
                heading_level = level as usize;
            }
            Event::End(TagEnd::Heading(_)) => {
                in_heading = false;
            }
            Event::Text(ref text) if in_heading => match heading_level {
                1 => {
                    current_h1 = text.to_string();
                    current_h2.clear();
                }
                2 => {
                    current_h2 = text.to_string();
                }
                _ => {}
            },
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(ref lang))) => {
                in_code_block = true;
                code_block_lang = lang.to_string();
                code_block_content.clear();
                block_start = line_of(content, range.start);
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some(language) = MdLanguage::from_fence(&code_block_lang) {
                    let (source, metadata) = parse_annotations(&code_block_content, block_start)?;
                    let mut name = format_test_name(&current_h1, &current_h2);
                    let numbered = format!("{name} (");
                    let repeats = tests
                        .iter()
                        .filter(|t: &&MdTest| t.name == name || t.name.starts_with(&numbered))
                        .count();
                    if repeats > 0 {
                        name = format!("{} ({})", name, repeats + 1);
                    }
                    tests.push(MdTest {
                        name,
                        source,
                        language,
                        metadata,
                        location: Location::new(file.to_string(), block_start, 0),
                        config: current_config.clone(),
                    });
                } else if code_block_lang == "toml" {
                    current_config = toml::from_str(&code_block_content)?;
                }

                in_code_block = false;
                code_block_content.clear();
            }
            Event::Text(ref text) if in_code_block => {
                code_block_content.push_str(text);
            }
            _ => {}
        }
    }

    Ok(tests)
}

fn line_of(content: &str, offset: usize) -> usize {
    content[..offset.min(content.len())].matches('\n').count() + 1
}

fn format_test_name(h1: &str, h2: &str) -> String {
    match (h1.is_empty(), h2.is_empty()) {
        (true, _) => "Orphaned Test (no heading)".to_string(),
        (false, true) => h1.to_string(),
        (false, false) => format!("{} - {}", h1, h2),
    }
}

/// Strips `//!` metadata lines and collects `// error:` expectations, whose
/// line numbers refer to the stripped source
fn parse_annotations(code: &str, block_line: usize) -> Result<(String, TestMetadata), ParseError> {
    let mut metadata = TestMetadata::default();
    let mut source_lines = Vec::new();

    for (offset, line) in code.lines().enumerate() {
        if let Some(annotation) = line.trim_start().strip_prefix("//!") {
            let annotation = annotation.trim();
            if let Some(tags) = annotation.strip_prefix("tags:") {
                let tags_str = tags.trim().trim_start_matches('[').trim_end_matches(']');
                metadata.tags = tags_str.split(',').map(|s| s.trim().to_string()).collect();
            } else if let Some(ignore) = annotation.strip_prefix("ignore:") {
                metadata.ignore = Some(ignore.trim().to_string());
            } else {
                return Err(ParseError::InvalidAnnotation {
                    line: block_line + offset + 1,
                    message: format!("unknown annotation '{annotation}'"),
                });
            }
            continue;
        }

        source_lines.push(line);
        if let Some((_, expected)) = line.split_once("// error:") {
            let line_number = source_lines.len();
            for code in expected.split(',').map(str::trim) {
                if code.is_empty() || !code.chars().all(|c| c.is_ascii_lowercase() || c == '-') {
                    return Err(ParseError::InvalidAnnotation {
                        line: block_line + offset + 1,
                        message: format!("'{code}' is not a diagnostic code"),
                    });
                }
                metadata.expected.push(ExpectedProblem {
                    line: line_number,
                    code: code.to_string(),
                });
            }
        }
    }
    metadata.expected.sort();

    Ok((source_lines.join("\n"), metadata))
}

pub(crate) fn sanitize_test_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}
