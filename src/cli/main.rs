//! Command-line interface entry point for the degree-fulfillment and
//! course-recommendation engine.

mod args;
mod commands;
mod session;

use args::{Cli, Command};
use clap::Parser;
use degree_planner::config::Config;
use logger::{enable_debug, enable_verbose, info, init_file_logging, set_level, Level};
use session::Session;
use std::io::{self, BufRead, Write};

fn main() {
    let args = Cli::parse();

    // Load configuration once at startup and apply CLI overrides to it
    let mut config = Config::load();
    let defaults = Config::from_defaults();
    config.apply_overrides(&args.to_config_overrides());

    // Determine effective runtime log level: CLI flag overrides config; otherwise use config logging.level; fallback warn
    let effective_level = args
        .log_level
        .map(std::convert::Into::into)
        .or_else(|| parse_level(&config.logging.level))
        .unwrap_or(Level::Warn);

    let mut level = effective_level;
    if args.debug_flag || level == Level::Debug {
        level = Level::Debug;
        enable_debug();
    }

    // Verbose: enable if CLI flag OR config has verbose=true
    let verbose = args.verbose || config.logging.verbose;
    if verbose {
        enable_verbose();
    }
    set_level(level);

    // Initialize file logging: CLI flag wins, otherwise use config logging.file if set
    let config_log_path: Option<std::path::PathBuf> = if config.logging.file.is_empty() {
        None
    } else {
        Some(std::path::PathBuf::from(&config.logging.file))
    };

    if let Some(log_path) = args.log_file.as_ref().or(config_log_path.as_ref()) {
        let display_path = log_path.to_string_lossy();
        if init_file_logging(log_path) {
            if verbose {
                eprintln!("✓ File logging initialized at: {display_path}");
            } else {
                info!("File logging initialized at: {display_path}");
            }
        } else {
            eprintln!("✗ Failed to initialize file logging at: {display_path}");
        }
    }

    // Handle subcommands
    match args.command.unwrap_or_default() {
        Command::Config { subcommand } => {
            commands::config::run(subcommand, &mut config, &defaults);
        }
        Command::Repl => run_repl(&config),
    }
}

/// Runs the interactive session loop: reads lines from stdin until EOF,
/// dispatching each to a [`Session`] (spec.md §6.4).
fn run_repl(config: &Config) {
    let mut session = Session::new(config);
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        if stdout.flush().is_err() {
            break;
        }

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                eprintln!("read error: {e}");
                break;
            }
        }

        match session.dispatch(&line) {
            Ok(output) => {
                if !output.is_empty() {
                    print!("{output}");
                }
            }
            Err(e) => eprintln!("{e}"),
        }
    }
}

fn parse_level(val: &str) -> Option<Level> {
    match val.to_ascii_lowercase().as_str() {
        "error" => Some(Level::Error),
        "warn" => Some(Level::Warn),
        "info" => Some(Level::Info),
        "debug" => Some(Level::Debug),
        _ => None,
    }
}
