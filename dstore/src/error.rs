//! Store error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or loading the record store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database not found: {path}")]
    MissingDatabase { path: PathBuf },

    #[error("Invalid predicate: {0}")]
    InvalidPredicate(String),

    #[error("Value out of range for {what}: {value}")]
    OutOfRange { what: &'static str, value: i64 },
}

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// Check if this error was caused by the caller rather than the database
    pub fn is_caller_error(&self) -> bool {
        matches!(self, StoreError::InvalidPredicate(_))
    }
}
