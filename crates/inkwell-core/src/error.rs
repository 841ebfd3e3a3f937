//! Core error types for inkwell-core.
//!
//! This module defines the error hierarchy using thiserror. Session
//! commands that are rejected (wrong status, below the word target, no
//! persisted identity) come back as [`SessionError`] values and leave the
//! engine untouched, so callers can tell an ignored command from an
//! accepted one.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

use crate::writing::EngineStatus;

/// Core error type for inkwell-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Rejected session commands
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
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

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// A completed session already exists for this date and cannot be replaced
    #[error("A completed session already exists for {0}")]
    DateCompleted(NaiveDate),

    /// No record with the given identity
    #[error("No session with id {0}")]
    NotFound(i64),

    /// A stored row could not be decoded
    #[error("Corrupt row in sessions table: {0}")]
    Corrupt(String),

    /// Could not resolve the data directory
    #[error("Data directory unavailable: {0}")]
    DataDir(#[from] std::io::Error),
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

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Reasons a session command was not applied.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The command is not allowed in the engine's current status
    #[error("cannot {action} while session is {status}")]
    InvalidTransition {
        action: &'static str,
        status: EngineStatus,
    },

    /// Completion requested before the daily word target was met
    #[error("{words} words written, {target} required")]
    BelowWordTarget { words: usize, target: usize },

    /// Post-completion update requested without a persisted record
    #[error("session has no persisted record")]
    MissingIdentity,

    /// No interrupted session exists for the requested date
    #[error("no draft for {0}")]
    NoDraft(NaiveDate),

    /// The repository call backing the command failed
    #[error("persistence failed: {0}")]
    Persistence(#[from] DatabaseError),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg) => {
                if inner.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_error_wraps_layer_errors() {
        let err: CoreError = ConfigError::UnknownKey("writing.colour".into()).into();
        assert_eq!(
            err.to_string(),
            "Configuration error: unknown config key: writing.colour"
        );

        let err: CoreError = SessionError::BelowWordTarget {
            words: 120,
            target: 300,
        }
        .into();
        assert!(matches!(err, CoreError::Session(_)));
    }

    #[test]
    fn locked_sqlite_maps_to_locked() {
        let busy = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_LOCKED),
            None,
        );
        assert!(matches!(DatabaseError::from(busy), DatabaseError::Locked));
    }
}
