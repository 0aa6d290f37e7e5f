//! Integration tests for configuration management

use degree_planner::config::{Config, ConfigOverrides};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper to create a temporary config directory
fn setup_temp_config() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_file = temp_dir.path().join("config.toml");
    (temp_dir, config_file)
}

#[test]
fn test_config_from_defaults() {
    let config = Config::from_defaults();

    // Should have non-empty defaults for critical fields
    assert!(
        !config.logging.level.is_empty(),
        "Default log level should not be empty"
    );
    assert!(
        !config.paths.catalog_file.is_empty(),
        "Default catalog_file should not be empty"
    );
    assert!(
        !config.paths.degree_file.is_empty(),
        "Default degree_file should not be empty"
    );
}

#[test]
fn test_config_from_toml_basic() {
    let toml_str = r#"
[logging]
level = "info"
file = "/tmp/test.log"
verbose = true

[paths]
catalog_file = "./catalog.json"
degree_file = "./degrees.json"
data_dir = "./data"
"#;

    let config = Config::from_toml(toml_str).expect("Failed to parse TOML");

    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.file, "/tmp/test.log");
    assert!(config.logging.verbose);
    assert_eq!(config.paths.catalog_file, "./catalog.json");
    assert_eq!(config.paths.degree_file, "./degrees.json");
    assert_eq!(config.paths.data_dir, "./data");
}

#[test]
fn test_config_from_toml_partial() {
    // Test that missing fields within sections use defaults
    let toml_str = r#"
[logging]
level = "error"

[paths]
"#;

    let config = Config::from_toml(toml_str).expect("Failed to parse partial TOML");

    assert_eq!(config.logging.level, "error");
    assert_eq!(config.logging.file, ""); // Default empty
    assert!(!config.logging.verbose); // Default false
    assert_eq!(config.paths.catalog_file, ""); // Default empty
}

#[test]
fn test_config_variable_expansion() {
    let toml_str = r#"
[logging]
file = "$DEGREE_PLANNER/test.log"

[paths]
catalog_file = "$DEGREE_PLANNER/catalog.json"
"#;

    let config = Config::from_toml(toml_str).expect("Failed to parse TOML with variables");

    // Variable should be expanded to actual path
    assert!(config.logging.file.contains("degreeplanner"));
    assert!(!config.logging.file.contains("$DEGREE_PLANNER"));
    assert!(config.paths.catalog_file.contains("degreeplanner"));
    assert!(!config.paths.catalog_file.contains("$DEGREE_PLANNER"));
}

#[test]
fn test_config_get_set() {
    let mut config = Config::from_defaults();

    // Test get
    let level = config.get("level");
    assert!(level.is_some());

    // Test set
    config.set("level", "debug").expect("Failed to set level");
    assert_eq!(config.get("level").unwrap(), "debug");

    config
        .set("verbose", "true")
        .expect("Failed to set verbose");
    assert_eq!(config.get("verbose").unwrap(), "true");
    assert!(config.logging.verbose);

    // Test unknown key
    assert!(config.get("unknown_key").is_none());
    assert!(config.set("unknown_key", "value").is_err());
}

#[test]
fn test_config_unset() {
    let mut config = Config::from_defaults();
    let defaults = Config::from_defaults();

    // Change a value
    config.set("level", "debug").expect("Failed to set level");
    assert_eq!(config.logging.level, "debug");

    // Unset should restore default
    config
        .unset("level", &defaults)
        .expect("Failed to unset level");
    assert_eq!(config.logging.level, defaults.logging.level);
}

#[test]
fn test_config_save_and_load() {
    let (_temp_dir, config_file) = setup_temp_config();

    // Create and save a config
    let mut config = Config::from_defaults();
    config.set("level", "info").expect("Failed to set level");

    // Manually save to our test location
    if let Some(parent) = config_file.parent() {
        fs::create_dir_all(parent).expect("Failed to create dir");
    }
    let toml_str = toml::to_string_pretty(&config).expect("Failed to serialize");
    fs::write(&config_file, toml_str).expect("Failed to write config");

    // Load and verify
    let content = fs::read_to_string(&config_file).expect("Failed to read config");
    let loaded_config = Config::from_toml(&content).expect("Failed to parse loaded config");

    assert_eq!(loaded_config.logging.level, "info");
}

#[test]
fn test_config_overrides_apply() {
    let mut config = Config::from_defaults();

    let overrides = ConfigOverrides {
        level: Some("error".to_string()),
        file: Some("/custom/path.log".to_string()),
        verbose: Some(true),
        catalog_file: Some("./custom_catalog.json".to_string()),
        degree_file: Some("./custom_degrees.json".to_string()),
        data_dir: Some("./custom_data".to_string()),
    };

    config.apply_overrides(&overrides);

    assert_eq!(config.logging.level, "error");
    assert_eq!(config.logging.file, "/custom/path.log");
    assert!(config.logging.verbose);
    assert_eq!(config.paths.catalog_file, "./custom_catalog.json");
    assert_eq!(config.paths.degree_file, "./custom_degrees.json");
    assert_eq!(config.paths.data_dir, "./custom_data");
}

#[test]
fn test_config_overrides_partial() {
    let mut config = Config::from_defaults();

    // Apply partial overrides - only level changes
    let overrides = ConfigOverrides {
        level: Some("debug".to_string()),
        file: None,
        verbose: None,
        catalog_file: None,
        degree_file: None,
        data_dir: None,
    };

    config.apply_overrides(&overrides);

    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_config_display_format() {
    let config = Config::from_defaults();
    let display_str = format!("{config}");

    // Should contain section headers (lowercase)
    assert!(display_str.contains("[logging]"));
    assert!(display_str.contains("[paths]"));

    // Should contain field names
    assert!(display_str.contains("level"));
    assert!(display_str.contains("file"));
    assert!(display_str.contains("verbose"));
}

#[test]
fn test_merge_defaults_adds_missing_fields() {
    // Create a minimal config with empty fields
    let toml_str = r#"
[logging]
level = "error"
file = ""
verbose = false

[paths]
catalog_file = ""
degree_file = ""
data_dir = ""
"#;

    let mut config = Config::from_toml(toml_str).expect("Failed to parse minimal config");
    let defaults = Config::from_defaults();

    // Merge should add missing fields from defaults
    let changed = config.merge_defaults(&defaults);

    assert!(
        changed,
        "merge_defaults should return true when fields are added"
    );
}

#[test]
fn test_merge_defaults_preserves_existing() {
    let toml_str = r#"
[logging]
level = "error"
file = "/my/custom/path.log"
verbose = false

[paths]
catalog_file = ""
degree_file = ""
data_dir = ""
"#;

    let mut config = Config::from_toml(toml_str).expect("Failed to parse config");
    let defaults = Config::from_defaults();

    config.merge_defaults(&defaults);

    // Custom values should be preserved
    assert_eq!(config.logging.level, "error");
    assert_eq!(config.logging.file, "/my/custom/path.log");
}

#[test]
fn test_get_degree_planner_dir() {
    let dir = Config::get_degree_planner_dir();

    // Should contain "degreeplanner" in the path
    assert!(dir.to_string_lossy().contains("degreeplanner"));

    // Should not be empty or just "."
    assert_ne!(dir, PathBuf::from("."));
}

#[test]
fn test_get_config_file_path() {
    let path = Config::get_config_file_path();

    // Should end with config.toml or dconfig.toml
    let path_str = path.to_string_lossy();
    assert!(path_str.ends_with("config.toml") || path_str.ends_with("dconfig.toml"));
}
