//! Remote side of the engine.
//!
//! - [`Transport`]: executes HTTP verbs ([`HttpTransport`] uses reqwest)
//! - [`ConditionalClient`]: the [`RemoteClient`] contract, adding ETag
//!   revalidation and status mapping on top of a transport
//! - [`RemoteStore`]: the [`Store`](crate::Store) view over a client

pub mod client;
pub mod etag;
pub mod store;
pub mod transport;

pub use client::{ConditionalClient, RemoteClient, RemoteResult};
pub use etag::{EtagCache, ETAG_NAMESPACE};
pub use store::RemoteStore;
pub use transport::{HttpTransport, RemoteConfig, Transport, TransportRequest, TransportResponse};
