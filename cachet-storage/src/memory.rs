//! In-memory provider for tests and single-process scenarios.

use crate::error::{StorageError, StorageResult};
use crate::{check_namespace, KeyValueStore, StorageProvider};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

type Namespaces = HashMap<String, HashMap<String, String>>;

/// Thread-safe, non-persistent provider.
///
/// Clones share the same data, so a test can keep a handle to inspect what
/// the engine wrote.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    data: Arc<RwLock<Namespaces>>,
}

impl MemoryStorage {
    /// Creates an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys held in `namespace`.
    pub fn len(&self, namespace: &str) -> usize {
        self.data
            .read()
            .map(|data| data.get(namespace).map_or(0, HashMap::len))
            .unwrap_or(0)
    }
}

impl StorageProvider for MemoryStorage {
    fn open(&self, name: &str) -> StorageResult<Arc<dyn KeyValueStore>> {
        check_namespace(name)?;
        Ok(Arc::new(MemoryNamespace {
            data: Arc::clone(&self.data),
            namespace: name.to_string(),
        }))
    }
}

struct MemoryNamespace {
    data: Arc<RwLock<Namespaces>>,
    namespace: String,
}

impl KeyValueStore for MemoryNamespace {
    fn get_string(&self, key: &str) -> StorageResult<Option<String>> {
        let data = self.data.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(data
            .get(&self.namespace)
            .and_then(|ns| ns.get(key))
            .cloned())
    }

    fn put_string(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut data = self.data.write().map_err(|_| StorageError::LockPoisoned)?;
        data.entry(self.namespace.clone())
            .or_default()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete_string(&self, key: &str) -> StorageResult<bool> {
        let mut data = self.data.write().map_err(|_| StorageError::LockPoisoned)?;
        Ok(data
            .get_mut(&self.namespace)
            .is_some_and(|ns| ns.remove(key).is_some()))
    }

    fn clear(&self) -> StorageResult<()> {
        let mut data = self.data.write().map_err(|_| StorageError::LockPoisoned)?;
        data.remove(&self.namespace);
        Ok(())
    }
}
