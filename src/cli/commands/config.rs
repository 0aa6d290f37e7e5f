//! Config command handler

use crate::args::ConfigSubcommand;
use degree_planner::config::Config;
use std::io::{self, Write};

/// Dispatch config subcommands
///
/// Routes config subcommands to their appropriate handlers. If no subcommand is provided,
/// displays all configuration values.
///
/// # Arguments
/// * `subcommand` - The config subcommand to execute (None displays all config)
/// * `config` - The current configuration (may be modified by set/unset)
/// * `defaults` - Default configuration values for unset operations
pub fn run(subcommand: Option<ConfigSubcommand>, config: &mut Config, defaults: &Config) {
    match subcommand {
        None => handle_config_get(config, None),
        Some(ConfigSubcommand::Get { key }) => handle_config_get(config, key),
        Some(ConfigSubcommand::Set { key, value }) => handle_config_set(config, &key, &value),
        Some(ConfigSubcommand::Unset { key }) => handle_config_unset(config, defaults, &key),
        Some(ConfigSubcommand::Reset) => handle_config_reset(),
    }
}

/// Handle the config get subcommand
///
/// Displays configuration values. If a key is provided, shows only that value.
/// If no key is provided, shows all configuration in formatted layout.
pub fn handle_config_get(config: &Config, key: Option<String>) {
    if let Some(k) = key {
        match config.get(&k) {
            Some(value) => println!("{value}"),
            None => eprintln!("Unknown config key: '{k}'"),
        }
    } else {
        println!("\n=== Configuration ===\n");
        print!("{config}");
    }
}

/// Handle the config set subcommand
///
/// Sets a configuration value and persists it to disk. Validates the key and value
/// format, exiting with error if invalid.
pub fn handle_config_set(config: &mut Config, key: &str, value: &str) {
    if let Err(e) = config.set(key, value) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    if let Err(e) = config.save() {
        eprintln!("Failed to save config: {e}");
        std::process::exit(1);
    }

    println!("✓ Set {key} = {value}");
}

/// Handle the config unset subcommand
///
/// Resets a configuration value to its default and persists to disk. Exits with
/// error if the key is invalid.
pub fn handle_config_unset(config: &mut Config, defaults: &Config, key: &str) {
    if let Err(e) = config.unset(key, defaults) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    if let Err(e) = config.save() {
        eprintln!("Failed to save config: {e}");
        std::process::exit(1);
    }

    println!("✓ Reset {key} to default");
}

/// Handle the config reset subcommand
///
/// Resets all configuration to defaults by deleting the config file. Requires user
/// confirmation before proceeding. If the config file doesn't exist, reports success
/// without prompting.
pub fn handle_config_reset() {
    if !Config::get_config_file_path().exists() {
        println!("✓ Config is already at defaults");
        return;
    }

    print!("Are you sure you want to reset config to defaults? (y/n): ");
    if io::stdout().flush().is_err() {
        eprintln!("Warning: Failed to flush stdout");
    }

    let mut response = String::new();
    if io::stdin().read_line(&mut response).is_err() {
        eprintln!("Failed to read user input");
        std::process::exit(1);
    }

    if response.trim().eq_ignore_ascii_case("y") || response.trim().eq_ignore_ascii_case("yes") {
        if let Err(e) = Config::reset() {
            eprintln!("Failed to remove config file: {e}");
            std::process::exit(1);
        }
        println!("✓ Config reset to defaults");
    } else {
        println!("✗ Reset cancelled");
    }
}
