//! The outcome of a store operation.

use crate::error::StoreError;
use crate::record::Record;

/// Result of a store operation: the record it concerned plus an optional
/// error.
///
/// A response with no error is a success. A `pending` response was accepted
/// by the local cache and queued for replay against the remote service; its
/// final outcome is only observable later through observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub object: Record,
    pub error: Option<StoreError>,
    pub pending: bool,
}

impl Response {
    /// A successful response.
    pub fn success(object: Record) -> Self {
        Self {
            object,
            error: None,
            pending: false,
        }
    }

    /// A failed response for `object`.
    pub fn failure(object: Record, error: StoreError) -> Self {
        Self {
            object,
            error: Some(error),
            pending: false,
        }
    }

    /// Marks this response as accepted locally and queued.
    #[must_use]
    pub fn into_pending(mut self) -> Self {
        if self.error.is_none() {
            self.pending = true;
        }
        self
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn is_not_modified(&self) -> bool {
        self.status() == Some(304)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn has_precondition_failed(&self) -> bool {
        self.status() == Some(412)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// The record's key.
    pub fn key(&self) -> &str {
        &self.object.key
    }

    /// The record's value, if any.
    pub fn value(&self) -> Option<&str> {
        self.object.value()
    }

    fn status(&self) -> Option<u16> {
        self.error.as_ref().and_then(StoreError::status)
    }
}
