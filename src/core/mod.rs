//! Core module for common functionality across all targets

pub mod attribute;
pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod io;
pub mod matcher;
pub mod models;
pub mod recommend;

/// Returns the current version of the `degree-planner` crate
#[must_use]
pub const fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// The `logger` module moved to standalone crate; use `logger` directly.
