//! Error types for the sync layer.
//!
//! Store operations never return these: they report failures inside a
//! `Response`. `SyncError` covers engine assembly and the transport seam.

use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur while building or wiring the engine.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Network error.
    #[error("network error: {0}")]
    Network(String),

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(#[from] cachet_storage::StorageError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// No Tokio runtime was available to host the dispatcher.
    #[error("no tokio runtime: {0}")]
    Runtime(String),
}
