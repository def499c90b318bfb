//! The unit of storage.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single `(collection, key) -> value` item.
///
/// Identity is the `(collection, key)` pair. The value is an opaque string
/// payload and is `None` when the item was deleted or never fetched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    pub collection: String,
    pub key: String,
    #[serde(default)]
    pub value: Option<String>,
}

impl Record {
    /// Creates a record with a value.
    pub fn new(
        collection: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            collection: collection.into(),
            key: key.into(),
            value: Some(value.into()),
        }
    }

    /// Creates a record identity with no value.
    pub fn empty(collection: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            key: key.into(),
            value: None,
        }
    }

    /// Returns a copy of this identity carrying `value`.
    #[must_use]
    pub fn with_value(&self, value: Option<String>) -> Self {
        Self {
            collection: self.collection.clone(),
            key: self.key.clone(),
            value,
        }
    }

    /// Returns the value as a string slice, if present.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Returns true if both records name the same `(collection, key)`.
    pub fn same_identity(&self, other: &Record) -> bool {
        self.collection == other.collection && self.key == other.key
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.key)
    }
}
