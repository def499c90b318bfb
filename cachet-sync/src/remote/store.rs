//! Remote store: a [`Store`] over a [`RemoteClient`].

use super::client::RemoteClient;
use crate::dispatcher::Dispatcher;
use crate::observer::{Observer, ObserverHandler};
use crate::store::Store;
use async_trait::async_trait;
use cachet_types::{Method, Request, Response};
use std::sync::Arc;
use tracing::debug;

/// Talks to the remote service for one collection.
///
/// Every call, including reads and failures, is pushed to observers. No
/// retries happen here: replay of failed offline mutations is the request
/// cache's job.
pub struct RemoteStore {
    collection: String,
    base_url: String,
    client: Arc<dyn RemoteClient>,
    observers: Arc<ObserverHandler>,
    dispatcher: Dispatcher,
}

impl RemoteStore {
    pub fn new(
        collection: impl Into<String>,
        base_url: impl Into<String>,
        client: Arc<dyn RemoteClient>,
        observers: Arc<ObserverHandler>,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            collection: collection.into(),
            base_url: base_url.into(),
            client,
            observers,
            dispatcher,
        }
    }

    /// The handler this store notifies.
    pub fn observers(&self) -> &Arc<ObserverHandler> {
        &self.observers
    }

    /// The URL of `key` in this collection.
    pub fn url_for(&self, key: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&self.collection),
            urlencoding::encode(key)
        )
    }

    async fn call(&self, request: Request) -> Response {
        let url = self.url_for(&request.object.key);
        let token = request.access_token.as_deref();
        let object = request.object.clone();

        let outcome = match request.method {
            Method::Get => self
                .client
                .get(&url, token, request.force)
                .await
                .map(Some),
            Method::Put => {
                let value = object.value.clone().unwrap_or_default();
                self.client
                    .put(&url, token, &value, request.force)
                    .await
                    .map(Some)
            }
            Method::Delete => self
                .client
                .delete(&url, token, request.force)
                .await
                .map(|()| None),
        };

        match outcome {
            Ok(value) => Response::success(object.with_value(value)),
            Err(error) => {
                debug!("Remote {} {} failed: {}", request.method, object, error);
                Response::failure(object, error)
            }
        }
    }
}

#[async_trait]
impl Store for RemoteStore {
    fn collection(&self) -> &str {
        &self.collection
    }

    fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    async fn execute(&self, request: Request) -> Response {
        let response = self.call(request).await;
        self.observers.notify_response(response.clone());
        response
    }

    async fn contains(&self, token: Option<&str>, key: &str) -> Response {
        let response = self.get(token, key).await;
        Response {
            object: response.object.with_value(None),
            ..response
        }
    }

    fn add_observer(&self, observer: Arc<dyn Observer>) -> bool {
        self.observers.add(observer)
    }

    fn remove_observer(&self, observer: &Arc<dyn Observer>) -> bool {
        self.observers.remove(observer)
    }
}
