//! Persisted ETag cache.
//!
//! One entry per URL. An empty string is stored when a successful response
//! carried no ETag, so "seen without validator" and "never seen" stay
//! distinguishable.

use cachet_storage::KeyValueStore;
use std::sync::Arc;
use tracing::warn;

/// Namespace holding the ETag entries.
pub const ETAG_NAMESPACE: &str = "etags";

/// `url -> etag` map backed by persistent storage.
#[derive(Clone)]
pub struct EtagCache {
    store: Arc<dyn KeyValueStore>,
}

impl EtagCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Returns the raw entry for `url`: `Some("")` means no ETag was observed.
    pub fn get(&self, url: &str) -> Option<String> {
        match self.store.get_string(url) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Failed to read ETag for {}: {}", url, e);
                None
            }
        }
    }

    /// Returns the ETag usable as a validator for `url`, skipping the empty
    /// sentinel.
    pub fn validator(&self, url: &str) -> Option<String> {
        self.get(url).filter(|etag| !etag.is_empty())
    }

    /// Records the ETag returned by a successful response.
    pub fn record(&self, url: &str, etag: Option<&str>) {
        if let Err(e) = self.store.put_string(url, etag.unwrap_or_default()) {
            warn!("Failed to store ETag for {}: {}", url, e);
        }
    }

    /// Drops every entry.
    pub fn clear(&self) {
        if let Err(e) = self.store.clear() {
            warn!("Failed to clear ETag cache: {}", e);
        }
    }
}
