//! Engine-facing error categories (spec.md §7). Kept as a hand-rolled enum
//! with a manual `Display`/`Error` impl, matching the teacher's
//! `Result<_, String>`-centric style rather than pulling in `thiserror`.

use std::fmt;

/// An input-validation or disambiguation failure surfaced to the CLI (or any
/// other host). None of these represent an internal invariant violation —
/// those are programmer bugs per spec.md §7 and are expected to panic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// No degree with this name exists in the catalog.
    UnknownDegree(String),
    /// The REPL line didn't match any known command.
    UnknownCommand(String),
    /// A semester index argument was out of range or non-numeric.
    BadSemesterIndex(String),
    /// A course-name search matched more than one catalog entry; the caller
    /// must re-invoke with the disambiguated index.
    Ambiguous(Vec<String>),
    /// The index given to resolve a paused disambiguation was non-numeric
    /// or out of range of the candidate list.
    InvalidSelection(String),
    /// Reading or writing a file failed.
    Io(String),
    /// Input JSON failed to parse or was structurally invalid.
    Json(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownDegree(name) => write!(f, "unknown degree: '{name}'"),
            Self::UnknownCommand(cmd) => write!(f, "unknown command: '{cmd}'"),
            Self::BadSemesterIndex(raw) => write!(f, "bad semester index: '{raw}'"),
            Self::Ambiguous(candidates) => {
                writeln!(f, "ambiguous course name; choose one:")?;
                for (i, c) in candidates.iter().enumerate() {
                    writeln!(f, "  {}) {c}", i + 1)?;
                }
                Ok(())
            }
            Self::InvalidSelection(raw) => write!(f, "invalid selection: '{raw}'"),
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
            Self::Json(msg) => write!(f, "JSON error: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}
