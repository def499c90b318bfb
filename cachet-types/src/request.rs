//! Requests against a store and their durable queued form.

use crate::record::Record;
use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The verb of a request.
///
/// Persisted as an integer tag (`1 = GET`, `2 = PUT`, `3 = DELETE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Method {
    Get,
    Put,
    Delete,
}

impl Method {
    /// Returns true for verbs that change state.
    pub fn is_mutation(self) -> bool {
        matches!(self, Self::Put | Self::Delete)
    }

    /// Returns the HTTP verb name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl From<Method> for u8 {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => 1,
            Method::Put => 2,
            Method::Delete => 3,
        }
    }
}

impl TryFrom<u8> for Method {
    type Error = Error;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            1 => Ok(Self::Get),
            2 => Ok(Self::Put),
            3 => Ok(Self::Delete),
            other => Err(Error::InvalidMethod(other)),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An operation against a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    /// The target identity, and for PUT the value to write.
    pub object: Record,
    /// The local value captured right before an optimistic offline mutation.
    /// Only set for queued PUT/DELETE.
    pub fallback: Option<Record>,
    /// Skip conditional-cache revalidation.
    pub force: bool,
    pub access_token: Option<String>,
}

impl Request {
    /// Creates a request with no fallback, no token and `force = false`.
    pub fn new(method: Method, object: Record) -> Self {
        Self {
            method,
            object,
            fallback: None,
            force: false,
            access_token: None,
        }
    }

    /// Creates a GET request.
    pub fn get(collection: impl Into<String>, key: impl Into<String>) -> Self {
        Self::new(Method::Get, Record::empty(collection, key))
    }

    /// Creates a PUT request.
    pub fn put(
        collection: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::new(Method::Put, Record::new(collection, key, value))
    }

    /// Creates a DELETE request.
    pub fn delete(collection: impl Into<String>, key: impl Into<String>) -> Self {
        Self::new(Method::Delete, Record::empty(collection, key))
    }

    /// Sets the fallback record.
    #[must_use]
    pub fn with_fallback(mut self, fallback: Record) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Sets the access token.
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.access_token = token;
        self
    }

    /// Sets the `force` flag.
    #[must_use]
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}

/// Serializable form of a queued `Request`.
///
/// Created when an offline operation is accepted locally, destroyed once it
/// has been replayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingRequest {
    pub method: Method,
    #[serde(default)]
    pub force: bool,
    pub object: Record,
    #[serde(default)]
    pub fallback: Option<Record>,
    #[serde(default)]
    pub access_token: Option<String>,
}

impl From<Request> for PendingRequest {
    fn from(request: Request) -> Self {
        Self {
            method: request.method,
            force: request.force,
            object: request.object,
            fallback: request.fallback,
            access_token: request.access_token,
        }
    }
}

impl From<PendingRequest> for Request {
    fn from(pending: PendingRequest) -> Self {
        Self {
            method: pending.method,
            object: pending.object,
            fallback: pending.fallback,
            force: pending.force,
            access_token: pending.access_token,
        }
    }
}
