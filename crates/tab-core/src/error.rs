//! Core error types for tab-core.
//!
//! Storage errors never cross the [`StateStore`](crate::StateStore) boundary.
//! Store implementations use these types internally, log them, and fall back
//! to defaults.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for tab-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Unknown configuration key
    #[error("unknown config key: {0}")]
    UnknownConfigKey(String),

    /// Configuration value that cannot be parsed for its key
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidConfigValue { key: String, message: String },
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the backing database
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// The data directory could not be determined or created
    #[error("Data directory unavailable: {0}")]
    DataDir(#[source] std::io::Error),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked by another writer
    #[error("Database is locked")]
    Locked,

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        use rusqlite::ErrorCode;
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg)
                if matches!(e.code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) =>
            {
                StorageError::Locked
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
