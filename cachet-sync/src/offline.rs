//! Offline store: connectivity-aware policy over a local and a remote store.
//!
//! # Policy
//!
//! | Operation     | Connected                                        | Disconnected |
//! |---------------|--------------------------------------------------|--------------|
//! | `get`         | remote, then write-through to local              | local read + queued GET |
//! | `put`/`delete`| remote, then mirror into local                   | capture fallback, write local, queue |
//! | `contains`    | local                                            | local |
//!
//! A connected `get` answered with 304 returns the local copy; one answered
//! with 404 drops the local copy.
//!
//! An offline write is only queued once the local write succeeded, and a
//! write whose queue append fails is rolled back to the captured fallback,
//! so the cache never holds a value the queue does not know about.

use crate::connectivity::Connectivity;
use crate::dispatcher::Dispatcher;
use crate::local::LocalStore;
use crate::observer::Observer;
use crate::remote::RemoteStore;
use crate::request_cache::RequestCache;
use crate::store::Store;
use async_trait::async_trait;
use cachet_types::{Method, Record, Request, Response, StoreError};
use std::sync::Arc;
use tracing::{debug, warn};

/// Offline-first store for one collection.
pub struct OfflineStore {
    local: Arc<LocalStore>,
    remote: Arc<RemoteStore>,
    connectivity: Arc<dyn Connectivity>,
    requests: Arc<RequestCache>,
}

impl OfflineStore {
    pub fn new(
        local: Arc<LocalStore>,
        remote: Arc<RemoteStore>,
        connectivity: Arc<dyn Connectivity>,
        requests: Arc<RequestCache>,
    ) -> Self {
        Self {
            local,
            remote,
            connectivity,
            requests,
        }
    }

    /// The local cache behind this store.
    pub fn local(&self) -> &Arc<LocalStore> {
        &self.local
    }

    /// The remote store behind this store.
    pub fn remote(&self) -> &Arc<RemoteStore> {
        &self.remote
    }

    pub fn is_connected(&self) -> bool {
        self.connectivity.is_connected()
    }

    async fn fetch(&self, request: Request) -> Response {
        let key = request.object.key.clone();

        if !self.is_connected() {
            let cached = self.local.get(None, &key).await;
            if let Err(e) = self.requests.queue_get(request) {
                warn!("Failed to queue refresh of {}: {}", cached.object, e);
            }
            return cached;
        }

        let remote = self.remote.execute(request).await;
        if remote.is_success() {
            let value = remote.value().unwrap_or_default().to_string();
            return self.local.put(None, &key, &value).await;
        }
        if remote.is_not_found() {
            debug!("{} gone remotely, dropping local copy", remote.object);
            self.local.delete(None, &key).await;
            return remote;
        }
        if remote.is_not_modified() {
            return self.local.get(None, &key).await;
        }
        remote
    }

    async fn execute_with_fallback(&self, request: Request) -> Response {
        let key = request.object.key.clone();

        if self.is_connected() {
            let method = request.method;
            let remote = self.remote.execute(request).await;
            if remote.is_failure() {
                return remote;
            }
            return match method {
                Method::Delete => self.local.delete(None, &key).await,
                _ => {
                    let value = remote.value().unwrap_or_default().to_string();
                    self.local.put(None, &key, &value).await
                }
            };
        }

        // A missing key yields a fallback with no value: restoring it deletes.
        let current = self.local.get(None, &key).await;
        if current.is_failure() && !current.is_not_found() {
            warn!("Cannot capture fallback for {}: {:?}", current.object, current.error);
            return current;
        }
        let fallback = current.object;
        let request = request.with_fallback(fallback.clone());

        let local = self.local.execute(request.clone()).await;
        if local.is_failure() {
            return local;
        }
        let queued = match request.method {
            Method::Delete => self.requests.queue_delete(request),
            _ => self.requests.queue_put(request),
        };
        if let Err(e) = queued {
            warn!("Failed to queue {}, rolling back local write: {}", local.object, e);
            self.restore(&fallback).await;
            return Response::failure(local.object, StoreError::Storage(e.to_string()));
        }
        local.into_pending()
    }

    async fn restore(&self, fallback: &Record) {
        let restored = match fallback.value() {
            Some(value) => self.local.put(None, &fallback.key, value).await,
            None => self.local.delete(None, &fallback.key).await,
        };
        if restored.is_failure() {
            warn!("Rollback of {} failed: {:?}", fallback, restored.error);
        }
    }

    fn shares_observers(&self) -> bool {
        Arc::ptr_eq(self.local.observers(), self.remote.observers())
    }
}

#[async_trait]
impl Store for OfflineStore {
    fn collection(&self) -> &str {
        self.local.collection()
    }

    fn dispatcher(&self) -> &Dispatcher {
        self.local.dispatcher()
    }

    async fn execute(&self, request: Request) -> Response {
        match request.method {
            Method::Get => self.fetch(request).await,
            Method::Put | Method::Delete => self.execute_with_fallback(request).await,
        }
    }

    async fn contains(&self, token: Option<&str>, key: &str) -> Response {
        self.local.contains(token, key).await
    }

    /// Registers on both the local and the remote store, since a result may
    /// come from either depending on connectivity at call time. When both
    /// stores share one handler the observer is registered once.
    fn add_observer(&self, observer: Arc<dyn Observer>) -> bool {
        if self.shares_observers() {
            return self.local.add_observer(observer);
        }
        let local = self.local.add_observer(Arc::clone(&observer));
        let remote = self.remote.add_observer(observer);
        local && remote
    }

    fn remove_observer(&self, observer: &Arc<dyn Observer>) -> bool {
        if self.shares_observers() {
            return self.local.remove_observer(observer);
        }
        let local = self.local.remove_observer(observer);
        let remote = self.remote.remove_observer(observer);
        local && remote
    }
}
