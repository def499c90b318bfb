//! Worker pool + single dispatch queue.
//!
//! Blocking and network work runs on Tokio workers. Completions are pushed as
//! boxed jobs onto one unbounded channel drained by a single task, so every
//! callback and every observer delivery runs from the same ordered context
//! and never inline on the thread that started the operation.

use crate::error::{SyncError, SyncResult};
use std::future::Future;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Handle to the dispatch queue. Cheap to clone.
#[derive(Clone)]
pub struct Dispatcher {
    tx: mpsc::UnboundedSender<Job>,
    runtime: Handle,
}

impl Dispatcher {
    /// Starts a dispatcher on the current Tokio runtime.
    pub fn new() -> SyncResult<Self> {
        let runtime = Handle::try_current().map_err(|e| SyncError::Runtime(e.to_string()))?;
        Ok(Self::with_handle(runtime))
    }

    /// Starts a dispatcher on the given runtime.
    pub fn with_handle(runtime: Handle) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();
        runtime.spawn(async move {
            while let Some(job) = rx.recv().await {
                job();
            }
            debug!("Dispatch queue closed");
        });
        Self { tx, runtime }
    }

    /// Queues `job` on the dispatch context.
    /// Returns false if the dispatch loop has stopped.
    pub fn post(&self, job: impl FnOnce() + Send + 'static) -> bool {
        self.tx.send(Box::new(job)).is_ok()
    }

    /// Runs `work` on a worker and hands its output to `callback` on the
    /// dispatch context.
    pub fn complete<F, C>(&self, work: F, callback: C)
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
        C: FnOnce(F::Output) + Send + 'static,
    {
        let dispatcher = self.clone();
        self.runtime.spawn(async move {
            let output = work.await;
            dispatcher.post(move || callback(output));
        });
    }

    /// Posts `job` to the dispatch context after `delay`.
    ///
    /// Aborting the returned handle before the delay elapses cancels the job.
    pub fn schedule(&self, delay: Duration, job: impl FnOnce() + Send + 'static) -> JoinHandle<()> {
        let dispatcher = self.clone();
        self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            dispatcher.post(job);
        })
    }

    /// Runs blocking `work` on the blocking pool.
    pub fn spawn_blocking<F, T>(&self, work: F) -> JoinHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.runtime.spawn_blocking(work)
    }

    /// Waits until every job posted before this call has run.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.post(move || {
            let _ = done_tx.send(());
        }) {
            let _ = done_rx.await;
        }
    }
}
