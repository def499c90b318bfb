//! Engine: owns every shared component and hands out per-collection stores.
//!
//! One `CacheEngine` is built per application and threaded through to
//! whoever needs a store. It owns the storage provider, the ETag cache (via
//! the remote client), the global request cache and the dispatcher; nothing
//! is reachable through global state.

use crate::connectivity::Connectivity;
use crate::dispatcher::Dispatcher;
use crate::error::{SyncError, SyncResult};
use crate::local::{records_namespace, LocalStore};
use crate::observer::ObserverHandler;
use crate::offline::OfflineStore;
use crate::remote::{
    ConditionalClient, EtagCache, HttpTransport, RemoteClient, RemoteConfig, RemoteStore,
    ETAG_NAMESPACE,
};
use crate::request_cache::{ReplayReport, ReplayTarget, RequestCache, REQUEST_CACHE_NAMESPACE};
use crate::store::Store;
use async_trait::async_trait;
use cachet_storage::{SqliteStorage, StorageProvider};
use cachet_types::PendingRequest;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Configuration for the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Remote endpoint.
    pub remote: RemoteConfig,
    /// Observer debounce window (ms).
    pub debounce_ms: u64,
    /// SQLite database file; `None` keeps everything in memory.
    pub database_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            remote: RemoteConfig::default(),
            debounce_ms: 100,
            database_path: None,
        }
    }
}

impl EngineConfig {
    /// Parses a JSON config; missing fields take their defaults.
    pub fn from_json(json: &str) -> SyncResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    fn validate(&self) -> SyncResult<()> {
        let base = &self.remote.base_url;
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(SyncError::Config(format!("remote base_url must be http(s): {base}")));
        }
        if self.remote.timeout_secs == 0 {
            return Err(SyncError::Config("remote timeout_secs must be positive".into()));
        }
        Ok(())
    }
}

/// The offline-first cache engine.
pub struct CacheEngine {
    config: EngineConfig,
    storage: Arc<dyn StorageProvider>,
    client: Arc<dyn RemoteClient>,
    connectivity: Arc<dyn Connectivity>,
    requests: Arc<RequestCache>,
    dispatcher: Dispatcher,
    stores: Mutex<HashMap<String, Arc<OfflineStore>>>,
}

impl CacheEngine {
    /// Builds an engine with SQLite persistence and the HTTP remote client.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(config: EngineConfig, connectivity: Arc<dyn Connectivity>) -> SyncResult<Self> {
        config.validate()?;
        let storage: Arc<dyn StorageProvider> = match &config.database_path {
            Some(path) => Arc::new(SqliteStorage::open(path)?),
            None => Arc::new(SqliteStorage::open_in_memory()?),
        };
        let etags = EtagCache::new(storage.open(ETAG_NAMESPACE)?);
        let transport = Arc::new(HttpTransport::new(&config.remote)?);
        let client = Arc::new(ConditionalClient::new(transport, etags));
        Self::from_parts(config, storage, client, connectivity)
    }

    /// Builds an engine from explicit collaborators.
    pub fn from_parts(
        config: EngineConfig,
        storage: Arc<dyn StorageProvider>,
        client: Arc<dyn RemoteClient>,
        connectivity: Arc<dyn Connectivity>,
    ) -> SyncResult<Self> {
        let dispatcher = Dispatcher::new()?;
        let requests = Arc::new(RequestCache::new(storage.open(REQUEST_CACHE_NAMESPACE)?));
        info!(
            "Cache engine ready (remote: {}, queued: {})",
            config.remote.base_url,
            requests.len()
        );
        Ok(Self {
            config,
            storage,
            client,
            connectivity,
            requests,
            dispatcher,
            stores: Mutex::new(HashMap::new()),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn request_cache(&self) -> &Arc<RequestCache> {
        &self.requests
    }

    pub fn is_connected(&self) -> bool {
        self.connectivity.is_connected()
    }

    /// Returns the offline store for `collection`, creating it on first use.
    pub fn store(&self, collection: &str) -> SyncResult<Arc<OfflineStore>> {
        if collection.is_empty() {
            return Err(SyncError::Config("collection name must not be empty".into()));
        }
        let mut stores = self.stores.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(store) = stores.get(collection) {
            return Ok(Arc::clone(store));
        }

        debug!("Opening collection {}", collection);
        // One handler per collection: a connected write notifies from both
        // halves and must collapse into one debounced delivery.
        let observers = Arc::new(ObserverHandler::new(
            self.dispatcher.clone(),
            self.config.debounce(),
        ));
        let local = LocalStore::new(
            collection,
            self.storage.open(&records_namespace(collection))?,
            Arc::clone(&observers),
            self.dispatcher.clone(),
        );
        let remote = RemoteStore::new(
            collection,
            self.config.remote.base_url.clone(),
            Arc::clone(&self.client),
            observers,
            self.dispatcher.clone(),
        );
        let store = Arc::new(OfflineStore::new(
            Arc::new(local),
            Arc::new(remote),
            Arc::clone(&self.connectivity),
            Arc::clone(&self.requests),
        ));
        stores.insert(collection.to_string(), Arc::clone(&store));
        Ok(store)
    }

    /// Snapshot of the durable queue, oldest first.
    pub fn pending(&self) -> SyncResult<Vec<PendingRequest>> {
        Ok(self.requests.pending()?)
    }

    /// Replays the durable queue with `token` applied to every request.
    ///
    /// Does nothing while disconnected, leaving the queue intact.
    pub async fn execute_pending(&self, token: Option<&str>) -> ReplayReport {
        if !self.is_connected() {
            debug!("Skipping replay while disconnected");
            return ReplayReport::default();
        }
        let report = self.requests.execute_pending(token, self).await;
        if report.replayed > 0 || report.dropped > 0 {
            info!(
                "Replay finished: {} replayed, {} failed, {} restored, {} dropped",
                report.replayed, report.failed, report.restored, report.dropped
            );
        }
        report
    }
}

#[async_trait]
impl ReplayTarget for CacheEngine {
    async fn target(&self, collection: &str) -> Option<Arc<dyn Store>> {
        match self.store(collection) {
            Ok(store) => Some(store as Arc<dyn Store>),
            Err(e) => {
                warn!("Cannot open collection {} for replay: {}", collection, e);
                None
            }
        }
    }

    async fn fallback(&self, collection: &str) -> Option<Arc<dyn Store>> {
        match self.store(collection) {
            Ok(store) => Some(Arc::clone(store.local()) as Arc<dyn Store>),
            Err(e) => {
                warn!("Cannot open collection {} for fallback: {}", collection, e);
                None
            }
        }
    }
}
