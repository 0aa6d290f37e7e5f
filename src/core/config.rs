//! Configuration module for the degree-planner CLI.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;

/// Default CLI configuration loaded based on build profile.
/// Uses release defaults in release mode, debug defaults in debug mode.
#[cfg(not(debug_assertions))]
const CONFIG_DEFAULTS: &str = include_str!("../../assets/DefaultCLIConfigRelease.toml");

#[cfg(debug_assertions)]
const CONFIG_DEFAULTS: &str = include_str!("../../assets/DefaultCLIConfigDebug.toml");

#[cfg(not(debug_assertions))]
const CONFIG_FILE_NAME: &str = "config.toml";

#[cfg(debug_assertions)]
const CONFIG_FILE_NAME: &str = "dconfig.toml";

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug)
    #[serde(default)]
    pub level: String,
    /// Log file path
    #[serde(default)]
    pub file: String,
    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,
}

/// Paths configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Default course catalog JSON file (spec.md §6.2)
    #[serde(default)]
    pub catalog_file: String,
    /// Default degree JSON file (spec.md §6.3)
    #[serde(default)]
    pub degree_file: String,
    /// Directory holding per-user schedule state
    #[serde(default)]
    pub data_dir: String,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Logging settings
    pub logging: LoggingConfig,
    /// Path settings
    #[serde(default)]
    pub paths: PathsConfig,
}

/// Optional CLI overrides for configuration values
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Override logging level
    pub level: Option<String>,
    /// Override log file path
    pub file: Option<String>,
    /// Override verbose flag
    pub verbose: Option<bool>,
    /// Override catalog file path
    pub catalog_file: Option<String>,
    /// Override degree file path
    pub degree_file: Option<String>,
    /// Override data directory
    pub data_dir: Option<String>,
}

impl Config {
    /// Get the `$DEGREE_PLANNER` directory path
    ///
    /// Returns:
    /// - Linux: `~/.config/degreeplanner`
    /// - macOS: `~/Library/Application Support/degreeplanner`
    /// - Windows: `%APPDATA%\degreeplanner`
    #[must_use]
    pub fn get_degree_planner_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("degreeplanner")
    }

    /// Merge missing fields from defaults into this config.
    ///
    /// Only fields that are empty in the current config and non-empty in
    /// defaults are updated. Returns whether anything changed.
    #[allow(clippy::useless_let_if_seq)]
    pub fn merge_defaults(&mut self, defaults: &Self) -> bool {
        let mut changed = false;

        if self.logging.level.is_empty() && !defaults.logging.level.is_empty() {
            self.logging.level.clone_from(&defaults.logging.level);
            changed = true;
        }
        if self.logging.file.is_empty() && !defaults.logging.file.is_empty() {
            self.logging.file.clone_from(&defaults.logging.file);
            changed = true;
        }

        if self.paths.catalog_file.is_empty() && !defaults.paths.catalog_file.is_empty() {
            self.paths.catalog_file.clone_from(&defaults.paths.catalog_file);
            changed = true;
        }
        if self.paths.degree_file.is_empty() && !defaults.paths.degree_file.is_empty() {
            self.paths.degree_file.clone_from(&defaults.paths.degree_file);
            changed = true;
        }
        if self.paths.data_dir.is_empty() && !defaults.paths.data_dir.is_empty() {
            self.paths.data_dir.clone_from(&defaults.paths.data_dir);
            changed = true;
        }

        changed
    }

    /// Apply CLI-provided overrides onto the loaded configuration. Only
    /// non-`None` values replace config values, and only for this run —
    /// the persisted file is untouched.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(level) = &overrides.level {
            self.logging.level.clone_from(level);
        }
        if let Some(file) = &overrides.file {
            self.logging.file.clone_from(file);
        }
        if let Some(verbose) = overrides.verbose {
            self.logging.verbose = verbose;
        }
        if let Some(catalog_file) = &overrides.catalog_file {
            self.paths.catalog_file.clone_from(catalog_file);
        }
        if let Some(degree_file) = &overrides.degree_file {
            self.paths.degree_file.clone_from(degree_file);
        }
        if let Some(data_dir) = &overrides.data_dir {
            self.paths.data_dir.clone_from(data_dir);
        }
    }

    /// Get the user config file path: `config.toml` for release builds,
    /// `dconfig.toml` for debug builds, inside [`get_degree_planner_dir`].
    ///
    /// [`get_degree_planner_dir`]: Self::get_degree_planner_dir
    #[must_use]
    pub fn get_config_file_path() -> PathBuf {
        Self::get_degree_planner_dir().join(CONFIG_FILE_NAME)
    }

    /// Expand `$DEGREE_PLANNER` in a string to the actual config directory.
    #[must_use]
    fn expand_variables(value: &str) -> String {
        if value.contains("$DEGREE_PLANNER") {
            let dir = Self::get_degree_planner_dir();
            value.replace("$DEGREE_PLANNER", dir.to_str().unwrap_or("."))
        } else {
            value.to_string()
        }
    }

    /// Parses a TOML configuration string and expands `$DEGREE_PLANNER`
    /// variables in path-like values. Missing fields use their serde
    /// defaults (empty strings or `false`).
    ///
    /// # Errors
    /// Returns an error if the TOML cannot be parsed or doesn't match the expected schema.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let mut config: Self = toml::from_str(toml_str)?;

        config.logging.file = Self::expand_variables(&config.logging.file);
        config.paths.catalog_file = Self::expand_variables(&config.paths.catalog_file);
        config.paths.degree_file = Self::expand_variables(&config.paths.degree_file);
        config.paths.data_dir = Self::expand_variables(&config.paths.data_dir);

        Ok(config)
    }

    /// Loads the compiled-in default configuration bundled with the binary.
    ///
    /// # Panics
    /// Panics if the embedded default configuration is invalid TOML; this
    /// should never happen since the defaults are compiled into the binary.
    #[must_use]
    pub fn from_defaults() -> Self {
        Self::from_toml(CONFIG_DEFAULTS).expect("failed to parse compiled-in default configuration")
    }

    /// Loads configuration from file, or creates it from defaults on first run.
    /// Falls back to defaults if anything goes wrong while loading.
    #[must_use]
    pub fn load() -> Self {
        let config_file = Self::get_config_file_path();
        let defaults = Self::from_defaults();

        if config_file.exists() {
            if let Ok(content) = fs::read_to_string(&config_file) {
                if let Ok(mut config) = Self::from_toml(&content) {
                    if config.merge_defaults(&defaults) {
                        let _ = config.save();
                    }
                    return config;
                }
            }
        } else {
            if let Some(parent) = config_file.parent() {
                let _ = fs::create_dir_all(parent);
            }
            let _ = defaults.save();
            return defaults;
        }

        defaults
    }

    /// Serializes this config to TOML and writes it to the platform-specific
    /// config file, creating the parent directory if needed.
    ///
    /// # Errors
    /// Returns an error if serialization fails or the file cannot be written.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let config_file = Self::get_config_file_path();
        if let Some(parent) = config_file.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        fs::write(&config_file, toml_str)?;
        Ok(())
    }

    /// Gets a configuration value by key. Recognized keys: `level`, `file`,
    /// `verbose`, `catalog_file`/`catalog-file`, `degree_file`/`degree-file`,
    /// `data_dir`/`data-dir`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "level" => Some(self.logging.level.clone()),
            "file" => Some(self.logging.file.clone()),
            "verbose" => Some(self.logging.verbose.to_string()),
            "catalog_file" | "catalog-file" => Some(self.paths.catalog_file.clone()),
            "degree_file" | "degree-file" => Some(self.paths.degree_file.clone()),
            "data_dir" | "data-dir" => Some(self.paths.data_dir.clone()),
            _ => None,
        }
    }

    /// Sets a configuration value by key. Updates the in-memory config only;
    /// call [`save`](Self::save) to persist.
    ///
    /// # Errors
    /// Returns an error if the key is unrecognized or the value can't be parsed.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "level" => self.logging.level = value.to_string(),
            "file" => self.logging.file = value.to_string(),
            "verbose" => {
                self.logging.verbose = value
                    .parse::<bool>()
                    .map_err(|_| format!("invalid boolean value for 'verbose': '{value}'"))?;
            }
            "catalog_file" | "catalog-file" => self.paths.catalog_file = value.to_string(),
            "degree_file" | "degree-file" => self.paths.degree_file = value.to_string(),
            "data_dir" | "data-dir" => self.paths.data_dir = value.to_string(),
            _ => return Err(format!("unknown config key: '{key}'")),
        }
        Ok(())
    }

    /// Resets a single key to its value in `defaults`. Updates the in-memory
    /// config only; call [`save`](Self::save) to persist.
    ///
    /// # Errors
    /// Returns an error if the key is unrecognized.
    pub fn unset(&mut self, key: &str, defaults: &Self) -> Result<(), String> {
        match key {
            "level" => self.logging.level.clone_from(&defaults.logging.level),
            "file" => self.logging.file.clone_from(&defaults.logging.file),
            "verbose" => self.logging.verbose = defaults.logging.verbose,
            "catalog_file" | "catalog-file" => self.paths.catalog_file.clone_from(&defaults.paths.catalog_file),
            "degree_file" | "degree-file" => self.paths.degree_file.clone_from(&defaults.paths.degree_file),
            "data_dir" | "data-dir" => self.paths.data_dir.clone_from(&defaults.paths.data_dir),
            _ => return Err(format!("unknown config key: '{key}'")),
        }
        Ok(())
    }

    /// Deletes the configuration file so the next [`load`](Self::load) call
    /// recreates it from defaults. A no-op if the file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be deleted.
    pub fn reset() -> Result<(), std::io::Error> {
        let config_file = Self::get_config_file_path();
        if config_file.exists() {
            fs::remove_file(config_file)?;
        }
        Ok(())
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[logging]")?;
        writeln!(f, "  level = \"{}\"", self.logging.level)?;
        writeln!(f, "  file = \"{}\"", self.logging.file)?;
        writeln!(f, "  verbose = {}", self.logging.verbose)?;

        writeln!(f, "\n[paths]")?;
        writeln!(f, "  catalog_file = \"{}\"", self.paths.catalog_file)?;
        writeln!(f, "  degree_file = \"{}\"", self.paths.degree_file)?;
        writeln!(f, "  data_dir = \"{}\"", self.paths.data_dir)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_defaults_parses_without_panicking() {
        let config = Config::from_defaults();
        assert!(!config.logging.level.is_empty());
    }

    #[test]
    fn merge_defaults_only_fills_empty_fields() {
        let mut config = Config {
            logging: LoggingConfig {
                level: "debug".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let defaults = Config::from_defaults();
        assert!(config.merge_defaults(&defaults));
        assert_eq!(config.logging.level, "debug");
        assert!(!config.paths.catalog_file.is_empty());
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut config = Config::default();
        assert!(config.set("nonexistent", "x").is_err());
    }

    #[test]
    fn get_set_round_trip() {
        let mut config = Config::default();
        config.set("level", "warn").unwrap();
        assert_eq!(config.get("level").as_deref(), Some("warn"));
    }
}
