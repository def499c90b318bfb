//! Debounced observer fan-out.

use crate::dispatcher::Dispatcher;
use cachet_types::{Response, StoreError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Default debounce window.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// Receives the outcome of store operations.
///
/// Callbacks run on the dispatch context while the observer set is locked:
/// an observer must not add or remove observers from inside a callback.
pub trait Observer: Send + Sync {
    /// A success (or locally accepted, pending) result for `key`.
    fn on_change(&self, key: &str, value: Option<&str>);

    /// A failed result for `key`.
    fn on_error(&self, key: &str, error: &StoreError);
}

type ObserverSet = Arc<Mutex<Vec<Arc<dyn Observer>>>>;

/// Thread-safe observer set with a single debounce timer.
///
/// Each `notify_response` supersedes any delivery still waiting for its
/// window, so a burst of results delivers only the last one. The timer is
/// shared across keys: two different keys inside one window also collapse
/// into the later one.
pub struct ObserverHandler {
    observers: ObserverSet,
    scheduled: Mutex<Option<JoinHandle<()>>>,
    dispatcher: Dispatcher,
    debounce: Duration,
}

impl ObserverHandler {
    /// Creates a handler delivering through `dispatcher`.
    pub fn new(dispatcher: Dispatcher, debounce: Duration) -> Self {
        Self {
            observers: Arc::new(Mutex::new(Vec::new())),
            scheduled: Mutex::new(None),
            dispatcher,
            debounce,
        }
    }

    /// Registers an observer. Returns false if it was already registered.
    pub fn add(&self, observer: Arc<dyn Observer>) -> bool {
        let mut observers = lock(&self.observers);
        if observers.iter().any(|o| Arc::ptr_eq(o, &observer)) {
            return false;
        }
        observers.push(observer);
        true
    }

    /// Unregisters an observer. Returns false if it was not registered.
    pub fn remove(&self, observer: &Arc<dyn Observer>) -> bool {
        let mut observers = lock(&self.observers);
        let before = observers.len();
        observers.retain(|o| !Arc::ptr_eq(o, observer));
        observers.len() != before
    }

    /// Number of registered observers.
    pub fn len(&self) -> usize {
        lock(&self.observers).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Schedules delivery of `response`, cancelling any pending delivery.
    pub fn notify_response(&self, response: Response) {
        let observers = Arc::clone(&self.observers);
        let mut scheduled = lock(&self.scheduled);
        if let Some(pending) = scheduled.take() {
            pending.abort();
        }
        *scheduled = Some(
            self.dispatcher
                .schedule(self.debounce, move || deliver(&observers, &response)),
        );
    }
}

fn deliver(observers: &ObserverSet, response: &Response) {
    let observers = lock(observers);
    debug!(
        "Delivering {} for {} to {} observer(s)",
        if response.is_failure() { "error" } else { "change" },
        response.object,
        observers.len()
    );
    for observer in observers.iter() {
        match &response.error {
            Some(error) => observer.on_error(response.key(), error),
            None => observer.on_change(response.key(), response.value()),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
