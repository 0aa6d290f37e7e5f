//! CLI argument definitions for the degree-fulfillment and
//! course-recommendation engine.

use clap::{builder::BoolishValueParser, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use degree_planner::config::ConfigOverrides;
use logger::Level;

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
}

impl From<LogLevelArg> for Level {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Error => Self::Error,
            LogLevelArg::Warn => Self::Warn,
            LogLevelArg::Info => Self::Info,
            LogLevelArg::Debug => Self::Debug,
        }
    }
}

impl std::fmt::Display for LogLevelArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let as_str = match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
        };
        write!(f, "{as_str}")
    }
}

#[derive(Debug, Subcommand)]
pub enum ConfigSubcommand {
    /// Display configuration values.
    ///
    /// If a KEY is provided, displays only that configuration value.
    /// If no KEY is provided, displays all configuration values.
    Get {
        /// Optional configuration key to display (e.g., `level`, `file`, `catalog-file`)
        #[arg(value_name = "KEY")]
        key: Option<String>,
    },
    /// Set a configuration value.
    Set {
        /// Configuration key to set
        #[arg(value_name = "KEY")]
        key: String,
        /// Value to set
        #[arg(value_name = "VALUE")]
        value: String,
    },
    /// Unset a configuration value.
    Unset {
        /// Configuration key to unset
        #[arg(value_name = "KEY")]
        key: String,
    },
    /// Reset configuration to defaults (requires confirmation).
    Reset,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage configuration.
    ///
    /// If no subcommand is provided, displays all configuration values.
    Config {
        #[command(subcommand)]
        subcommand: Option<ConfigSubcommand>,
    },
    /// Start the interactive degree-planning session (spec.md §6.4).
    ///
    /// Reads commands from stdin, one per line, until EOF: `add`, `remove`,
    /// `schedule`, `print`, `fulfillment`, `degree`, `find`, `details`,
    /// `import`. This is the default when no subcommand is given.
    Repl,
}

impl Default for Command {
    fn default() -> Self {
        Self::Repl
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "degree-planner",
    about = "Degree-fulfillment and course-recommendation engine",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Cli {
    /// Set the runtime log level (error|warn|info|debug). Falls back to config if omitted.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevelArg>,

    /// Enable verbose output (runtime only)
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Enable debug-level logging and runtime debug flag (shorthand)
    #[arg(long = "debug")]
    pub debug_flag: bool,

    /// Write runtime logs to a file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    // --- Config overrides ---
    /// Override config logging level (stored in config file)
    #[arg(long = "config-level", value_enum)]
    pub config_level: Option<LogLevelArg>,

    /// Override config log file path
    #[arg(long = "config-log-file", value_name = "PATH")]
    pub config_log_file: Option<PathBuf>,

    /// Override config verbose flag (true/false)
    #[arg(long = "config-verbose", value_parser = BoolishValueParser::new())]
    pub config_verbose: Option<bool>,

    /// Override config catalog JSON path
    #[arg(long = "config-catalog-file", value_name = "PATH")]
    pub config_catalog_file: Option<PathBuf>,

    /// Override config catalog JSON path (short form)
    #[arg(long = "catalog-file", value_name = "PATH")]
    pub catalog_file: Option<PathBuf>,

    /// Override config degree JSON path
    #[arg(long = "config-degree-file", value_name = "PATH")]
    pub config_degree_file: Option<PathBuf>,

    /// Override config degree JSON path (short form)
    #[arg(long = "degree-file", value_name = "PATH")]
    pub degree_file: Option<PathBuf>,

    /// Override config data directory
    #[arg(long = "config-data-dir", value_name = "DIR")]
    pub config_data_dir: Option<PathBuf>,

    /// Override config data directory (short form)
    #[arg(long = "data-dir", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Subcommand to execute. Defaults to the interactive REPL.
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Convert CLI flags into config overrides
    pub fn to_config_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            level: self.config_level.map(|lvl| lvl.to_string().to_lowercase()),
            file: self
                .config_log_file
                .as_ref()
                .map(|p| p.to_string_lossy().to_string()),
            verbose: self.config_verbose,
            catalog_file: self
                .catalog_file
                .as_ref()
                .map(|p| p.to_string_lossy().to_string())
                .or_else(|| {
                    self.config_catalog_file
                        .as_ref()
                        .map(|p| p.to_string_lossy().to_string())
                }),
            degree_file: self
                .degree_file
                .as_ref()
                .map(|p| p.to_string_lossy().to_string())
                .or_else(|| {
                    self.config_degree_file
                        .as_ref()
                        .map(|p| p.to_string_lossy().to_string())
                }),
            data_dir: self
                .data_dir
                .as_ref()
                .map(|p| p.to_string_lossy().to_string())
                .or_else(|| {
                    self.config_data_dir
                        .as_ref()
                        .map(|p| p.to_string_lossy().to_string())
                }),
        }
    }
}
