//! Local cache store.
//!
//! Reads and writes one collection's records in a namespaced
//! [`KeyValueStore`]. Access tokens are ignored: local identity is purely
//! `(collection, key)`.

use crate::dispatcher::Dispatcher;
use crate::observer::{Observer, ObserverHandler};
use crate::store::Store;
use async_trait::async_trait;
use cachet_storage::KeyValueStore;
use cachet_types::{Method, Record, Request, Response, StoreError};
use std::sync::Arc;
use tracing::{debug, warn};

/// Namespace prefix for a collection's records.
pub const RECORDS_NAMESPACE_PREFIX: &str = "records/";

/// Builds the storage namespace holding `collection`.
pub fn records_namespace(collection: &str) -> String {
    format!("{RECORDS_NAMESPACE_PREFIX}{collection}")
}

/// The local half of the offline store.
#[derive(Clone)]
pub struct LocalStore {
    collection: String,
    records: Arc<dyn KeyValueStore>,
    observers: Arc<ObserverHandler>,
    dispatcher: Dispatcher,
}

impl LocalStore {
    pub fn new(
        collection: impl Into<String>,
        records: Arc<dyn KeyValueStore>,
        observers: Arc<ObserverHandler>,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            collection: collection.into(),
            records,
            observers,
            dispatcher,
        }
    }

    /// The handler this store notifies.
    pub fn observers(&self) -> &Arc<ObserverHandler> {
        &self.observers
    }

    /// Executes `request` on the calling thread.
    pub fn execute_blocking(&self, request: Request) -> Response {
        let key = request.object.key.clone();
        match request.method {
            Method::Get => self.get_blocking(&key),
            Method::Put => match request.object.value {
                Some(value) => self.put_blocking(&key, &value),
                None => self.delete_blocking(&key),
            },
            Method::Delete => self.delete_blocking(&key),
        }
    }

    pub fn get_blocking(&self, key: &str) -> Response {
        let identity = self.identity(key);
        match self.records.get_string(key) {
            Ok(Some(value)) => Response::success(identity.with_value(Some(value))),
            Ok(None) => Response::failure(identity, StoreError::NotFound),
            Err(e) => {
                warn!("Local read of {} failed: {}", identity, e);
                Response::failure(identity, StoreError::Storage(e.to_string()))
            }
        }
    }

    pub fn put_blocking(&self, key: &str, value: &str) -> Response {
        let record = Record::new(self.collection.as_str(), key, value);
        let response = match self.records.put_string(key, value) {
            Ok(()) => Response::success(record),
            Err(e) => {
                warn!("Local write of {} failed: {}", record, e);
                Response::failure(record, StoreError::Storage(e.to_string()))
            }
        };
        self.observers.notify_response(response.clone());
        response
    }

    pub fn delete_blocking(&self, key: &str) -> Response {
        let identity = self.identity(key);
        let response = match self.records.delete_string(key) {
            Ok(removed) => {
                debug!("Local delete of {} (existed: {})", identity, removed);
                Response::success(identity)
            }
            Err(e) => {
                warn!("Local delete of {} failed: {}", identity, e);
                Response::failure(identity, StoreError::Storage(e.to_string()))
            }
        };
        self.observers.notify_response(response.clone());
        response
    }

    pub fn contains_blocking(&self, key: &str) -> Response {
        let identity = self.identity(key);
        match self.records.contains(key) {
            Ok(true) => Response::success(identity),
            Ok(false) => Response::failure(identity, StoreError::NotFound),
            Err(e) => Response::failure(identity, StoreError::Storage(e.to_string())),
        }
    }

    fn identity(&self, key: &str) -> Record {
        Record::empty(self.collection.as_str(), key)
    }

    async fn on_worker(
        &self,
        key: &str,
        work: impl FnOnce(&Self) -> Response + Send + 'static,
    ) -> Response {
        let this = self.clone();
        match self.dispatcher.spawn_blocking(move || work(&this)).await {
            Ok(response) => response,
            Err(e) => Response::failure(
                self.identity(key),
                StoreError::Storage(format!("local worker failed: {e}")),
            ),
        }
    }
}

#[async_trait]
impl Store for LocalStore {
    fn collection(&self) -> &str {
        &self.collection
    }

    fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    async fn execute(&self, request: Request) -> Response {
        let key = request.object.key.clone();
        self.on_worker(&key, move |this| this.execute_blocking(request))
            .await
    }

    async fn contains(&self, _token: Option<&str>, key: &str) -> Response {
        let owned = key.to_string();
        self.on_worker(key, move |this| this.contains_blocking(&owned))
            .await
    }

    fn add_observer(&self, observer: Arc<dyn Observer>) -> bool {
        self.observers.add(observer)
    }

    fn remove_observer(&self, observer: &Arc<dyn Observer>) -> bool {
        self.observers.remove(observer)
    }
}
