// tests/config_test.rs
use git_lineage::config::{load_config, Config, CONFIG_FILE_NAME};
use serial_test::serial;
use std::env;
use std::fs;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

#[test]
fn test_load_default_config() {
    let config = Config::default();
    assert_eq!(config.tag_prefix, "[vV]");
    assert!(config.branches.contains_key("main"));
    assert!(config.branches.contains_key("develop"));
    assert!(config.branches.contains_key("release"));
    assert!(config.branches.contains_key("feature"));
}

#[test]
fn test_load_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    let toml_content = r#"
tag_prefix = "release-"

[branches.trunk]
regex = "^trunk$"

[branches.topic]
regex = "^topic/"
source_branches = ["trunk"]
"#;
    temp_file.write_all(toml_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = load_config(Some(temp_file.path().to_str().unwrap())).unwrap();
    assert_eq!(config.tag_prefix, "release-");
    assert_eq!(config.branches.len(), 2);
    assert_eq!(config.branches["topic"].source_branches, vec!["trunk"]);
    assert!(config.branches["trunk"].source_branches.is_empty());

    let patterns = config.source_branch_patterns("topic/login").unwrap();
    assert_eq!(patterns.len(), 1);
    assert!(patterns[0].is_match("trunk"));
}

#[test]
fn test_missing_sections_use_defaults() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"tag_prefix = \"ver\"\n").unwrap();
    temp_file.flush().unwrap();

    let config = load_config(Some(temp_file.path().to_str().unwrap())).unwrap();
    assert_eq!(config.tag_prefix, "ver");
    assert_eq!(config.branches, Config::default().branches);
}

#[test]
fn test_invalid_toml_is_config_error() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"tag_prefix = [").unwrap();
    temp_file.flush().unwrap();

    let err = load_config(Some(temp_file.path().to_str().unwrap())).unwrap_err();
    assert!(err.to_string().starts_with("Configuration error"));
}

#[test]
fn test_missing_explicit_file_is_io_error() {
    let err = load_config(Some("does/not/exist.toml")).unwrap_err();
    assert!(err.to_string().contains("I/O error"));
}

#[test]
#[serial]
fn test_load_from_working_directory() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join(CONFIG_FILE_NAME),
        "tag_prefix = \"rel/\"\n",
    )
    .unwrap();

    let original_dir = env::current_dir().unwrap();
    env::set_current_dir(temp_dir.path()).unwrap();
    let config = load_config(None);
    env::set_current_dir(original_dir).unwrap();

    assert_eq!(config.unwrap().tag_prefix, "rel/");
}

#[test]
fn test_tag_prefix_compiles() {
    let config = Config::default();
    let prefix = config.tag_prefix().unwrap();
    assert_eq!(prefix.pattern(), "[vV]");
    assert!(prefix.parse("V3.1.4").is_some());
}
