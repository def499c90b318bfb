//! Offline-first sync engine for Cachet.
//!
//! Reads and writes succeed immediately against a local cache and are
//! reconciled with a remote key/value service opportunistically. Mutations
//! accepted while offline are queued durably and replayed once connectivity
//! returns.
//!
//! # Architecture
//!
//! ## Components
//!
//! - **Local store**: one collection's records in namespaced persistence
//! - **Remote store**: the same operations against the remote service, with
//!   ETag-conditional requests (`If-None-Match` / `If-Match`)
//! - **Offline store**: picks local or remote per operation depending on
//!   connectivity, writes through on success, queues while offline
//! - **Request cache**: the single global FIFO of offline requests and the
//!   executor that replays it, restoring the captured fallback value when
//!   the server rejects a replayed mutation
//! - **Observer handler**: debounced fan-out of results to observers
//! - **Dispatcher**: the single context every callback and notification
//!   runs on
//!
//! Conflict resolution is last-writer-wins, except that a server rejection
//! (412 on a stale ETag) wins over the optimistic local write.
//!
//! # Example
//!
//! ```no_run
//! use cachet_sync::{CacheEngine, ConnectivityFlag, EngineConfig, Store};
//! use std::sync::Arc;
//!
//! # async fn run() -> cachet_sync::SyncResult<()> {
//! let connectivity = Arc::new(ConnectivityFlag::new(true));
//! let engine = CacheEngine::new(EngineConfig::default(), connectivity.clone())?;
//! let notes = engine.store("notes")?;
//!
//! notes.put(Some("token"), "welcome", "hello").await;
//! connectivity.set_connected(false);
//! notes.put(Some("token"), "welcome", "edited offline").await;
//!
//! connectivity.set_connected(true);
//! engine.execute_pending(Some("token")).await;
//! # Ok(())
//! # }
//! ```

pub mod connectivity;
pub mod dispatcher;
mod engine;
mod error;
pub mod local;
pub mod observer;
pub mod offline;
pub mod remote;
pub mod request_cache;
pub mod store;

pub use connectivity::{Connectivity, ConnectivityFlag};
pub use dispatcher::Dispatcher;
pub use engine::{CacheEngine, EngineConfig};
pub use error::{SyncError, SyncResult};
pub use local::LocalStore;
pub use observer::{Observer, ObserverHandler, DEFAULT_DEBOUNCE};
pub use offline::OfflineStore;
pub use remote::{
    ConditionalClient, EtagCache, HttpTransport, RemoteClient, RemoteConfig, RemoteResult,
    RemoteStore, Transport, TransportRequest, TransportResponse,
};
pub use request_cache::{ReplayReport, ReplayTarget, RequestCache, RequestExecutor};
pub use store::{Store, StoreCallbacks};

pub use cachet_types::{Method, PendingRequest, Record, Request, Response, StoreError};
