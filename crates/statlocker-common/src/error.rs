//! Error types for the StatLocker state engine
//!
//! Provides a unified error type and the persistence failure taxonomy.
//! Stores recover from every [`StorageError`] locally: failures degrade to
//! the in-memory state and are logged, never surfaced to UI callers.

use thiserror::Error;

/// Result type alias using StatLockerError
pub type Result<T> = std::result::Result<T, StatLockerError>;

/// Unified error type for StatLocker state operations
#[derive(Debug, Error)]
pub enum StatLockerError {
    // Persistence errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Persistence failure taxonomy
///
/// Every variant carries the storage key so log lines can name the
/// aggregate that failed to persist or load.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read key '{key}': {reason}")]
    Read { key: String, reason: String },

    #[error("Failed to write key '{key}': {reason}")]
    Write { key: String, reason: String },

    #[error("Failed to parse stored value for key '{key}': {reason}")]
    Parse { key: String, reason: String },
}

impl StorageError {
    /// Build a read error for a key
    pub fn read(key: impl Into<String>, reason: impl ToString) -> Self {
        Self::Read {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a write error for a key
    pub fn write(key: impl Into<String>, reason: impl ToString) -> Self {
        Self::Write {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a parse error for a key
    pub fn parse(key: impl Into<String>, reason: impl ToString) -> Self {
        Self::Parse {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    /// The storage key this error is about
    pub fn key(&self) -> &str {
        match self {
            Self::Read { key, .. } | Self::Write { key, .. } | Self::Parse { key, .. } => key,
        }
    }
}

// Implement From for common external error types
impl From<serde_json::Error> for StatLockerError {
    fn from(err: serde_json::Error) -> Self {
        StatLockerError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for StatLockerError {
    fn from(err: std::io::Error) -> Self {
        StatLockerError::Internal(err.to_string())
    }
}
