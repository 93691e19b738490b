//! Core error types for blockday-core.
//!
//! Only persistence and configuration problems surface as errors. Bad
//! display-level input (XP values, "HH:MM" strings, template ids) is
//! clamped or defaulted where it is read and never reaches this module.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for blockday-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// Whether the caller should retry the write rather than recompute.
    ///
    /// In-memory state is never rolled back when a store write fails, so a
    /// retryable error means "changes visible locally, not yet saved".
    pub fn is_retryable(&self) -> bool {
        match self {
            CoreError::Database(DatabaseError::OpenFailed { .. }) => false,
            CoreError::Database(DatabaseError::MigrationFailed(_)) => false,
            CoreError::Database(_) | CoreError::Io(_) => true,
            _ => false,
        }
    }
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Stored payload could not be decoded
    #[error("Corrupt record '{key}': {message}")]
    CorruptRecord { key: String, message: String },

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// A block id that does not exist in the schedule
    #[error("Block {id} not found in schedule for {date}")]
    UnknownBlock { id: u32, date: chrono::NaiveDate },

    /// Block duration must be at least one minute
    #[error("Invalid duration for block {id}: {minutes} minutes")]
    InvalidDuration { id: u32, minutes: u32 },

    /// No carry-over offer is pending
    #[error("No carry-over offer pending for {0}")]
    NoPendingOffer(chrono::NaiveDate),
}

// Helper implementations for converting from other error types

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg)
                if e.code == rusqlite::ErrorCode::DatabaseBusy
                    || e.code == rusqlite::ErrorCode::DatabaseLocked =>
            {
                DatabaseError::Locked
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_failures_are_retryable() {
        let err = CoreError::Database(DatabaseError::QueryFailed("disk full".into()));
        assert!(err.is_retryable());
        assert!(CoreError::Database(DatabaseError::Locked).is_retryable());
    }

    #[test]
    fn validation_is_not_retryable() {
        let err: CoreError = ValidationError::InvalidDuration { id: 3, minutes: 0 }.into();
        assert!(!err.is_retryable());
        assert_eq!(
            err.to_string(),
            "Validation error: Invalid duration for block 3: 0 minutes"
        );
    }

    #[test]
    fn locked_sqlite_maps_to_locked() {
        let raw = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        );
        assert!(matches!(DatabaseError::from(raw), DatabaseError::Locked));
    }
}
