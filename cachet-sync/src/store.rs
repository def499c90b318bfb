//! The store abstraction shared by the local, remote and offline stores.

use crate::dispatcher::Dispatcher;
use crate::observer::Observer;
use async_trait::async_trait;
use cachet_types::{Method, Record, Request, Response};
use std::sync::Arc;

/// A `(key) -> value` store scoped to one collection.
///
/// Awaiting a method runs the operation to completion on the caller's task.
/// The callback forms live in [`StoreCallbacks`].
#[async_trait]
pub trait Store: Send + Sync {
    /// The collection this store serves.
    fn collection(&self) -> &str;

    /// The dispatcher used for callbacks and notifications.
    fn dispatcher(&self) -> &Dispatcher;

    /// Executes a request against this store.
    async fn execute(&self, request: Request) -> Response;

    /// Succeeds if `key` exists, fails with `NotFound` otherwise.
    async fn contains(&self, token: Option<&str>, key: &str) -> Response;

    /// Registers an observer for results produced by this store.
    fn add_observer(&self, observer: Arc<dyn Observer>) -> bool;

    /// Unregisters an observer.
    fn remove_observer(&self, observer: &Arc<dyn Observer>) -> bool;

    async fn get(&self, token: Option<&str>, key: &str) -> Response {
        self.execute(request(Method::Get, self.collection(), key, None, token))
            .await
    }

    async fn put(&self, token: Option<&str>, key: &str, value: &str) -> Response {
        self.execute(request(Method::Put, self.collection(), key, Some(value), token))
            .await
    }

    async fn delete(&self, token: Option<&str>, key: &str) -> Response {
        self.execute(request(Method::Delete, self.collection(), key, None, token))
            .await
    }
}

fn request(
    method: Method,
    collection: &str,
    key: &str,
    value: Option<&str>,
    token: Option<&str>,
) -> Request {
    let object = Record {
        collection: collection.to_string(),
        key: key.to_string(),
        value: value.map(str::to_owned),
    };
    Request::new(method, object).with_token(token.map(str::to_owned))
}

/// Callback forms of the [`Store`] operations.
///
/// The operation runs on a worker; `callback` is invoked later on the
/// dispatch context, never inline.
pub trait StoreCallbacks {
    fn execute_with(&self, request: Request, callback: impl FnOnce(Response) + Send + 'static);

    fn get_with(
        &self,
        token: Option<String>,
        key: &str,
        callback: impl FnOnce(Response) + Send + 'static,
    );

    fn put_with(
        &self,
        token: Option<String>,
        key: &str,
        value: &str,
        callback: impl FnOnce(Response) + Send + 'static,
    );

    fn delete_with(
        &self,
        token: Option<String>,
        key: &str,
        callback: impl FnOnce(Response) + Send + 'static,
    );

    fn contains_with(
        &self,
        token: Option<String>,
        key: &str,
        callback: impl FnOnce(Response) + Send + 'static,
    );
}

impl<S: Store + ?Sized + 'static> StoreCallbacks for Arc<S> {
    fn execute_with(&self, request: Request, callback: impl FnOnce(Response) + Send + 'static) {
        let store = Arc::clone(self);
        self.dispatcher()
            .complete(async move { store.execute(request).await }, callback);
    }

    fn get_with(
        &self,
        token: Option<String>,
        key: &str,
        callback: impl FnOnce(Response) + Send + 'static,
    ) {
        let request = request(Method::Get, self.collection(), key, None, token.as_deref());
        self.execute_with(request, callback);
    }

    fn put_with(
        &self,
        token: Option<String>,
        key: &str,
        value: &str,
        callback: impl FnOnce(Response) + Send + 'static,
    ) {
        let request = request(Method::Put, self.collection(), key, Some(value), token.as_deref());
        self.execute_with(request, callback);
    }

    fn delete_with(
        &self,
        token: Option<String>,
        key: &str,
        callback: impl FnOnce(Response) + Send + 'static,
    ) {
        let request = request(Method::Delete, self.collection(), key, None, token.as_deref());
        self.execute_with(request, callback);
    }

    fn contains_with(
        &self,
        token: Option<String>,
        key: &str,
        callback: impl FnOnce(Response) + Send + 'static,
    ) {
        let store = Arc::clone(self);
        let key = key.to_string();
        self.dispatcher().complete(
            async move { store.contains(token.as_deref(), &key).await },
            callback,
        );
    }
}
