//! Request cache: the durable queue of offline requests and its replay
//! executor.

mod executor;
mod queue;

pub use executor::{ReplayReport, ReplayTarget, RequestExecutor};
pub use queue::{RequestCache, PENDING_REQUESTS_KEY, REQUEST_CACHE_NAMESPACE};
