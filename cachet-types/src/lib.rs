//! Core type definitions for Cachet.
//!
//! This crate defines the plain data model shared by every layer of the
//! offline-first cache:
//! - `Record`: the `(collection, key) -> value` unit of storage
//! - `Request` / `Method`: an operation against a store
//! - `Response` / `StoreError`: the outcome of that operation
//! - `PendingRequest`: the durable, serializable form of a queued request
//!
//! No I/O happens here; storage and transport live in `cachet-storage` and
//! `cachet-sync`.

mod error;
mod record;
mod request;
mod response;

pub use error::StoreError;
pub use record::Record;
pub use request::{Method, PendingRequest, Request};
pub use response::Response;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type conversions.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid method tag: {0}")]
    InvalidMethod(u8),
}
