//! Namespaced key/value persistence for Cachet.
//!
//! Everything the engine persists (cached records, ETags, the pending request
//! queue) goes through the small [`KeyValueStore`] contract: string keys,
//! string values, scoped to a logical namespace obtained from a
//! [`StorageProvider`].
//!
//! Two providers ship with the crate:
//! - [`SqliteStorage`]: one SQLite database (file or in-memory) shared by all
//!   namespaces
//! - [`MemoryStorage`]: plain hash maps, for tests and throwaway caches
//!
//! Both assume a single process owns the underlying data.

mod error;
mod memory;
mod sqlite;

pub use error::{StorageError, StorageResult};
pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

use std::sync::Arc;

/// String key/value access scoped to one namespace.
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, if any.
    fn get_string(&self, key: &str) -> StorageResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn put_string(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Removes `key`. Returns true if a value was removed.
    fn delete_string(&self, key: &str) -> StorageResult<bool>;

    /// Removes every key in the namespace.
    fn clear(&self) -> StorageResult<()>;

    /// Returns true if `key` holds a value.
    fn contains(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get_string(key)?.is_some())
    }
}

/// Hands out namespace-scoped stores.
pub trait StorageProvider: Send + Sync {
    /// Opens (creating if needed) the namespace `name`.
    fn open(&self, name: &str) -> StorageResult<Arc<dyn KeyValueStore>>;
}

pub(crate) fn check_namespace(name: &str) -> StorageResult<()> {
    if name.trim().is_empty() {
        return Err(StorageError::InvalidNamespace(name.to_string()));
    }
    Ok(())
}
