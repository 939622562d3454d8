//! Error types for the analyzer and its CLI driver.

use thiserror::Error;

/// A defect in a recorded log that makes it unanalyzable: not a tool bug,
/// but evidence the structure under test broke one of its contracted
/// invariants (or that the log itself is corrupt).
#[derive(Debug, Error)]
pub enum LogError {
    #[error("line {line}: expected `<type> <value> <start> <lin_time> <end>`, got {text:?}")]
    Malformed { line: usize, text: String },

    #[error("line {line}: unknown operation type {raw} (expected 0=INSERT or 1=REMOVE)")]
    UnknownOpType { line: usize, raw: u64 },

    #[error("{inserts} inserts but {removes} non-null removes: a remove claims a value no insert produced")]
    UnmatchedRemove { inserts: usize, removes: usize },

    #[error("value {value} was inserted {insert_count} times but removed {remove_count} times")]
    DuplicateValue {
        value: i64,
        insert_count: usize,
        remove_count: usize,
    },
}

/// Misconfiguration of the analyzer CLI itself.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required flag --{0}")]
    MissingFlag(&'static str),

    #[error("unknown flag {0}")]
    UnknownFlag(String),

    #[error("invalid value for --{flag}: {value:?}")]
    InvalidValue { flag: &'static str, value: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
