#![allow(dead_code)]

use async_trait::async_trait;
use cachet_storage::{
    KeyValueStore, MemoryStorage, StorageError, StorageProvider, StorageResult,
};
use cachet_sync::{
    CacheEngine, ConnectivityFlag, EngineConfig, Method, Observer, RemoteClient, RemoteConfig,
    RemoteResult, StoreError,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const BASE_URL: &str = "http://remote.test";
pub const DEBOUNCE_MS: u64 = 20;

pub fn url(collection: &str, key: &str) -> String {
    format!("{BASE_URL}/{collection}/{key}")
}

// ── Fake remote ──────────────────────────────────────────────────

/// A call seen by the fake remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub method: Method,
    pub url: String,
    pub token: Option<String>,
    pub force: bool,
}

/// In-memory remote service with scriptable failures.
#[derive(Default)]
pub struct FakeRemote {
    values: Mutex<HashMap<String, String>>,
    failures: Mutex<VecDeque<StoreError>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set(&self, collection: &str, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap()
            .insert(url(collection, key), value.to_string());
    }

    pub fn value(&self, collection: &str, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(&url(collection, key)).cloned()
    }

    /// The next call fails with `error` instead of touching state.
    pub fn fail_next(&self, error: StoreError) {
        self.failures.lock().unwrap().push_back(error);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(
        &self,
        method: Method,
        url: &str,
        token: Option<&str>,
        force: bool,
    ) -> RemoteResult<()> {
        self.calls.lock().unwrap().push(Call {
            method,
            url: url.to_string(),
            token: token.map(str::to_owned),
            force,
        });
        match self.failures.lock().unwrap().pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RemoteClient for FakeRemote {
    async fn get(&self, url: &str, token: Option<&str>, force: bool) -> RemoteResult<String> {
        self.record(Method::Get, url, token, force)?;
        self.values
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn put(
        &self,
        url: &str,
        token: Option<&str>,
        value: &str,
        force: bool,
    ) -> RemoteResult<String> {
        self.record(Method::Put, url, token, force)?;
        self.values
            .lock()
            .unwrap()
            .insert(url.to_string(), value.to_string());
        Ok(value.to_string())
    }

    async fn delete(&self, url: &str, token: Option<&str>, force: bool) -> RemoteResult<()> {
        self.record(Method::Delete, url, token, force)?;
        self.values.lock().unwrap().remove(url);
        Ok(())
    }
}

// ── Recording observer ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Change(String, Option<String>),
    Error(String, StoreError),
}

#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<Event>>,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

impl Observer for RecordingObserver {
    fn on_change(&self, key: &str, value: Option<&str>) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Change(key.to_string(), value.map(str::to_owned)));
    }

    fn on_error(&self, key: &str, error: &StoreError) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Error(key.to_string(), error.clone()));
    }
}

// ── Faulty storage ───────────────────────────────────────────────

/// Storage whose `namespace` rejects every write, and optionally every read.
/// Other namespaces are served by `inner`.
pub struct FaultyStorage {
    pub inner: MemoryStorage,
    pub namespace: String,
    pub reads_fail: bool,
}

impl StorageProvider for FaultyStorage {
    fn open(&self, name: &str) -> StorageResult<Arc<dyn KeyValueStore>> {
        if name == self.namespace {
            return Ok(Arc::new(FaultyNamespace {
                reads_fail: self.reads_fail,
            }));
        }
        self.inner.open(name)
    }
}

struct FaultyNamespace {
    reads_fail: bool,
}

impl KeyValueStore for FaultyNamespace {
    fn get_string(&self, _key: &str) -> StorageResult<Option<String>> {
        if self.reads_fail {
            return Err(StorageError::LockPoisoned);
        }
        Ok(None)
    }

    fn put_string(&self, _key: &str, _value: &str) -> StorageResult<()> {
        Err(StorageError::LockPoisoned)
    }

    fn delete_string(&self, _key: &str) -> StorageResult<bool> {
        Err(StorageError::LockPoisoned)
    }

    fn clear(&self) -> StorageResult<()> {
        Err(StorageError::LockPoisoned)
    }
}

// ── Engine harness ───────────────────────────────────────────────

pub struct Harness {
    pub engine: CacheEngine,
    pub remote: Arc<FakeRemote>,
    pub connectivity: Arc<ConnectivityFlag>,
    pub storage: MemoryStorage,
}

pub fn config() -> EngineConfig {
    EngineConfig {
        remote: RemoteConfig {
            base_url: BASE_URL.to_string(),
            timeout_secs: 5,
        },
        debounce_ms: DEBOUNCE_MS,
        database_path: None,
    }
}

/// Builds an engine over in-memory storage and a fake remote.
/// Must run inside a Tokio runtime.
pub fn harness() -> Harness {
    let storage = MemoryStorage::new();
    harness_over(Arc::new(storage.clone()), storage)
}

/// Like [`harness`], but `namespace` fails as described by [`FaultyStorage`].
pub fn faulty_harness(namespace: &str, reads_fail: bool) -> Harness {
    let storage = MemoryStorage::new();
    let faulty = FaultyStorage {
        inner: storage.clone(),
        namespace: namespace.to_string(),
        reads_fail,
    };
    harness_over(Arc::new(faulty), storage)
}

fn harness_over(provider: Arc<dyn StorageProvider>, storage: MemoryStorage) -> Harness {
    let remote = FakeRemote::new();
    let connectivity = Arc::new(ConnectivityFlag::new(true));
    let engine =
        CacheEngine::from_parts(config(), provider, remote.clone(), connectivity.clone()).unwrap();
    Harness {
        engine,
        remote,
        connectivity,
        storage,
    }
}

/// Waits out the debounce window and drains the dispatch queue.
pub async fn settle(harness: &Harness) {
    tokio::time::sleep(Duration::from_millis(DEBOUNCE_MS * 4)).await;
    harness.engine.dispatcher().flush().await;
}
