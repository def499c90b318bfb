//! Errors carried inside a `Response`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a store operation failed.
///
/// Every store boundary converts disk and network failures into one of these
/// and returns it inside a `Response`; none of them is ever propagated as a
/// panic or a bare `Err`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum StoreError {
    /// The remote copy matches the cached ETag (HTTP 304).
    #[error("not modified")]
    NotModified,

    /// The remote copy changed since the cached ETag (HTTP 412).
    #[error("precondition failed")]
    PreconditionFailed,

    /// The access token was missing or rejected (HTTP 401).
    #[error("unauthorized")]
    Unauthorized,

    /// The key does not exist (HTTP 404, or absent from the local cache).
    #[error("not found")]
    NotFound,

    /// Any other non-2xx status.
    #[error("HTTP {status}: {reason}")]
    Http { status: u16, reason: String },

    /// The request never produced a status line.
    #[error("transport error: {0}")]
    Transport(String),

    /// Local persistence failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// A payload could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Maps a non-2xx HTTP status to its error.
    pub fn from_status(status: u16, reason: impl Into<String>) -> Self {
        match status {
            304 => Self::NotModified,
            401 => Self::Unauthorized,
            404 => Self::NotFound,
            412 => Self::PreconditionFailed,
            _ => Self::Http {
                status,
                reason: reason.into(),
            },
        }
    }

    /// Returns the HTTP status this error stands for, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotModified => Some(304),
            Self::Unauthorized => Some(401),
            Self::NotFound => Some(404),
            Self::PreconditionFailed => Some(412),
            Self::Http { status, .. } => Some(*status),
            Self::Transport(_) | Self::Storage(_) | Self::Serialization(_) => None,
        }
    }
}
