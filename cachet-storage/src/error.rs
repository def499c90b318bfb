//! Error types for the storage layer.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A thread panicked while holding the store lock.
    #[error("storage lock poisoned")]
    LockPoisoned,

    /// Namespace names must be non-empty.
    #[error("invalid namespace: {0:?}")]
    InvalidNamespace(String),
}
