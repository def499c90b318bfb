//! Replays a drained batch of pending requests.

use crate::store::Store;
use async_trait::async_trait;
use cachet_types::{Method, PendingRequest, Record, Request};
use std::sync::Arc;
use tracing::{debug, warn};

/// Resolves the stores a replayed request runs against.
///
/// The queue is global, so each request is routed by its collection.
#[async_trait]
pub trait ReplayTarget: Send + Sync {
    /// The store that re-issues the request (normally the offline store).
    async fn target(&self, collection: &str) -> Option<Arc<dyn Store>>;

    /// The store that receives the fallback value when a mutation is
    /// rejected (normally the local store).
    async fn fallback(&self, collection: &str) -> Option<Arc<dyn Store>>;
}

/// Counters for one replay run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayReport {
    /// Requests re-issued.
    pub replayed: usize,
    /// Re-issued requests that came back as failures.
    pub failed: usize,
    /// Fallback values written back after a rejected mutation.
    pub restored: usize,
    /// Requests whose collection could not be resolved.
    pub dropped: usize,
}

/// Replays requests strictly in queue order.
pub struct RequestExecutor<'a> {
    target: &'a dyn ReplayTarget,
}

impl<'a> RequestExecutor<'a> {
    pub fn new(target: &'a dyn ReplayTarget) -> Self {
        Self { target }
    }

    /// Replays `batch` with `token` applied to every request.
    ///
    /// GETs are best effort. A failed PUT or DELETE is not retried: its
    /// fallback is written back instead so the cache converges on the
    /// server's rejection.
    pub async fn replay(&self, batch: Vec<PendingRequest>, token: Option<&str>) -> ReplayReport {
        let mut report = ReplayReport::default();

        for pending in batch {
            let mut request = Request::from(pending);
            request.access_token = token.map(str::to_owned);
            let collection = request.object.collection.clone();

            let Some(store) = self.target.target(&collection).await else {
                warn!("Dropping {} {}: unknown collection", request.method, request.object);
                report.dropped += 1;
                continue;
            };

            let method = request.method;
            let object = request.object.clone();
            let fallback = request.fallback.take();
            let response = store.execute(request).await;
            report.replayed += 1;

            if response.is_success() {
                debug!("Replayed {} {}", method, object);
                continue;
            }
            report.failed += 1;

            if method == Method::Get {
                debug!("Replayed GET {} failed: {:?}", object, response.error);
                continue;
            }

            warn!(
                "Replayed {} {} rejected ({:?}), restoring fallback",
                method, object, response.error
            );
            if let Some(fallback) = fallback {
                if self.restore(fallback, token).await {
                    report.restored += 1;
                }
            }
        }

        report
    }

    async fn restore(&self, fallback: Record, token: Option<&str>) -> bool {
        let Some(store) = self.target.fallback(&fallback.collection).await else {
            warn!("No fallback store for {}", fallback);
            return false;
        };
        let response = match fallback.value() {
            Some(value) => store.put(token, &fallback.key, value).await,
            None => store.delete(token, &fallback.key).await,
        };
        if response.is_failure() {
            warn!("Fallback restore of {} failed: {:?}", fallback, response.error);
        }
        response.is_success()
    }
}
