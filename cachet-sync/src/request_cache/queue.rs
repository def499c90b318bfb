//! Durable FIFO of pending requests.

use super::executor::{ReplayReport, ReplayTarget, RequestExecutor};
use cachet_storage::{KeyValueStore, StorageResult};
use cachet_types::{Method, PendingRequest, Request};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Namespace holding the queue.
pub const REQUEST_CACHE_NAMESPACE: &str = "request_cache";

/// Fixed key the whole queue is stored under.
pub const PENDING_REQUESTS_KEY: &str = "pending_requests";

/// One global, ordered queue of requests accepted while offline.
///
/// The queue is persisted as a JSON array after every change. Entries are
/// never coalesced or reordered, even when several target the same key.
pub struct RequestCache {
    store: Arc<dyn KeyValueStore>,
    lock: Mutex<()>,
}

impl RequestCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    pub fn queue_get(&self, request: Request) -> StorageResult<()> {
        self.append(Method::Get, request)
    }

    pub fn queue_put(&self, request: Request) -> StorageResult<()> {
        self.append(Method::Put, request)
    }

    pub fn queue_delete(&self, request: Request) -> StorageResult<()> {
        self.append(Method::Delete, request)
    }

    /// Snapshot of the queue, oldest first.
    pub fn pending(&self) -> StorageResult<Vec<PendingRequest>> {
        let _guard = self.guard();
        self.load()
    }

    pub fn len(&self) -> usize {
        self.pending().map_or(0, |queue| queue.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every queued request.
    pub fn clear(&self) -> StorageResult<()> {
        let _guard = self.guard();
        self.store.delete_string(PENDING_REQUESTS_KEY)?;
        Ok(())
    }

    /// Empties the queue and returns what it held, in order.
    pub fn take(&self) -> StorageResult<Vec<PendingRequest>> {
        let _guard = self.guard();
        let queue = self.load()?;
        self.store.delete_string(PENDING_REQUESTS_KEY)?;
        Ok(queue)
    }

    /// Drains the queue and replays it through `target`, applying `token` to
    /// every request regardless of the token it was queued with.
    pub async fn execute_pending(
        &self,
        token: Option<&str>,
        target: &dyn ReplayTarget,
    ) -> ReplayReport {
        let batch = match self.take() {
            Ok(batch) => batch,
            Err(e) => {
                warn!("Failed to drain request cache: {}", e);
                return ReplayReport::default();
            }
        };
        if batch.is_empty() {
            return ReplayReport::default();
        }

        info!("Replaying {} pending request(s)", batch.len());
        RequestExecutor::new(target).replay(batch, token).await
    }

    fn append(&self, method: Method, mut request: Request) -> StorageResult<()> {
        request.method = method;
        let _guard = self.guard();
        let mut queue = self.load()?;
        debug!(
            "Queueing {} {} (position {})",
            method,
            request.object,
            queue.len()
        );
        queue.push(PendingRequest::from(request));
        self.save(&queue)
    }

    fn load(&self) -> StorageResult<Vec<PendingRequest>> {
        let Some(raw) = self.store.get_string(PENDING_REQUESTS_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(queue) => Ok(queue),
            Err(e) => {
                warn!("Discarding unreadable request cache: {}", e);
                Ok(Vec::new())
            }
        }
    }

    fn save(&self, queue: &[PendingRequest]) -> StorageResult<()> {
        match serde_json::to_string(queue) {
            Ok(raw) => self.store.put_string(PENDING_REQUESTS_KEY, &raw),
            Err(e) => {
                warn!("Failed to encode request cache: {}", e);
                Ok(())
            }
        }
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
