use cdom_indexer::{ConfigError, Indexer, IndexerConfig, SourceInput, CONFIG_FILE_NAME};
use cdom_parser::Language;

use crate::common::Fixture;

#[test]
fn test_discover_without_file_gives_defaults() {
    let fixture = Fixture::new();
    let config = IndexerConfig::discover(fixture.root_path()).unwrap();
    assert_eq!(config, IndexerConfig::default());
}

#[test]
fn test_discover_reads_cdom_toml() {
    let fixture = Fixture::new();
    fixture.add_file(
        CONFIG_FILE_NAME,
        r#"
language = "cpp"
jobs = 2

[diagnostics]
color = false
"#,
    );
    let config = IndexerConfig::discover(fixture.root_path()).unwrap();
    assert_eq!(config.language, Some(Language::Cpp));
    assert_eq!(config.jobs, 2);
    assert!(!config.diagnostics.color);
}

#[test]
fn test_missing_file_is_an_io_error() {
    let fixture = Fixture::new();
    let missing = fixture.root_path().join("nowhere.toml");
    let error = IndexerConfig::from_path(&missing).unwrap_err();
    assert!(matches!(error, ConfigError::Io { ref path, .. } if path == &missing));
}

#[test]
fn test_malformed_file_is_a_parse_error() {
    let fixture = Fixture::new();
    let path = fixture.add_file("broken.toml", "jobs = \"many\"\n");
    assert!(matches!(IndexerConfig::from_path(&path), Err(ConfigError::Parse(_))));
}

#[test]
fn test_configured_language_applies_to_every_file() {
    let fixture = Fixture::new();
    let path = fixture.add_file("cdom.toml", "language = \"cpp\"\n");
    let config = IndexerConfig::from_path(&path).unwrap();
    let indexer = Indexer::new(config).unwrap();
    // `.c` would mean C, where `class` is not a keyword
    let run = indexer
        .check_files(&[SourceInput::new("shapes.c", "class Shape { int sides; };")])
        .unwrap();
    assert_eq!(run.outcomes[0].unit.language, Language::Cpp);
    assert!(run.outcomes[0].diagnostics.is_empty());
}
