//! Core error types for questline-core.
//!
//! Every failure in the core is a typed, recoverable result the caller
//! can branch on. There are no fatal conditions and no internal retries;
//! transport-level retries belong to the storage layer's caller.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for questline-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Referenced entity is absent or not owned by the caller.
    #[error("{kind} '{id}' not found")]
    NotFound { kind: EntityKind, id: String },

    /// Operation violates a lifecycle invariant (e.g. double completion).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Malformed input
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// Shorthand for a [`CoreError::NotFound`] with an owned id.
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            kind,
            id: id.into(),
        }
    }
}

/// Entity classes referenced by [`CoreError::NotFound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Capture,
    Project,
    Session,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityKind::Capture => "capture",
            EntityKind::Project => "project",
            EntityKind::Session => "session",
        };
        f.write_str(name)
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

    /// Stored value could not be decoded into a domain type
    #[error("Corrupt row: {0}")]
    CorruptRow(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to parse configuration
    #[error("Failed to parse configuration from {path}: {message}")]
    ParseFailed { path: PathBuf, message: String },

    /// Failed to serialize configuration
    #[error("Failed to serialize configuration: {0}")]
    SerializeFailed(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Negative duration
    #[error("Duration must be non-negative, got {minutes} minutes")]
    NegativeDuration { minutes: i64 },

    /// Planned duration outside the supported set
    #[error("Planned duration must be one of 60, 90 or 120 minutes, got {minutes}")]
    UnsupportedPlannedDuration { minutes: u32 },

    /// Numeric field outside its allowed range
    #[error("Value for '{field}' must be in {min}..={max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// Empty text where content is required
    #[error("Field '{0}' must not be empty")]
    Empty(&'static str),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(DatabaseError::from(err))
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
