//! Remote client contract with ETag-conditional semantics.

use super::etag::EtagCache;
use super::transport::{Transport, TransportRequest, TransportResponse};
use async_trait::async_trait;
use cachet_types::{Method, StoreError};
use std::sync::Arc;
use tracing::debug;

/// Result type for remote calls.
pub type RemoteResult<T> = Result<T, StoreError>;

/// GET/PUT/DELETE against a URL.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Fetches the value at `url`.
    async fn get(&self, url: &str, access_token: Option<&str>, force: bool) -> RemoteResult<String>;

    /// Writes `value` to `url` and returns the value the server holds.
    async fn put(
        &self,
        url: &str,
        access_token: Option<&str>,
        value: &str,
        force: bool,
    ) -> RemoteResult<String>;

    /// Deletes the value at `url`.
    async fn delete(&self, url: &str, access_token: Option<&str>, force: bool) -> RemoteResult<()>;
}

/// [`RemoteClient`] implementing conditional caching over a [`Transport`].
///
/// - GET sends `If-None-Match` with the cached ETag unless `force` is set.
/// - PUT and DELETE send `If-Match` with the cached ETag.
/// - A successful GET or PUT records the response ETag (or the empty
///   sentinel) for the URL.
pub struct ConditionalClient {
    transport: Arc<dyn Transport>,
    etags: EtagCache,
}

impl ConditionalClient {
    pub fn new(transport: Arc<dyn Transport>, etags: EtagCache) -> Self {
        Self { transport, etags }
    }

    /// The ETag cache this client maintains.
    pub fn etags(&self) -> &EtagCache {
        &self.etags
    }

    fn prepare(
        &self,
        method: Method,
        url: &str,
        access_token: Option<&str>,
        force: bool,
    ) -> TransportRequest {
        let mut request = TransportRequest::new(method, url);
        if let Some(token) = access_token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }
        let validator_header = match method {
            Method::Get if force => None,
            Method::Get => Some("If-None-Match"),
            Method::Put | Method::Delete => Some("If-Match"),
        };
        if let Some(header) = validator_header {
            if let Some(etag) = self.etags.validator(url) {
                request = request.header(header, etag);
            }
        }
        request
    }

    async fn send(&self, request: TransportRequest) -> RemoteResult<TransportResponse> {
        let method = request.method;
        let url = request.url.clone();
        let response = self
            .transport
            .execute(request)
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        debug!("{} {} -> {}", method, url, response.status);
        if response.is_success() {
            Ok(response)
        } else {
            Err(StoreError::from_status(response.status, response.reason))
        }
    }
}

#[async_trait]
impl RemoteClient for ConditionalClient {
    async fn get(
        &self,
        url: &str,
        access_token: Option<&str>,
        force: bool,
    ) -> RemoteResult<String> {
        let request = self.prepare(Method::Get, url, access_token, force);
        let response = self.send(request).await?;
        self.etags.record(url, response.etag.as_deref());
        Ok(response.body)
    }

    async fn put(
        &self,
        url: &str,
        access_token: Option<&str>,
        value: &str,
        force: bool,
    ) -> RemoteResult<String> {
        let request = self
            .prepare(Method::Put, url, access_token, force)
            .body(value);
        let response = self.send(request).await?;
        self.etags.record(url, response.etag.as_deref());
        if response.body.is_empty() {
            Ok(value.to_string())
        } else {
            Ok(response.body)
        }
    }

    async fn delete(
        &self,
        url: &str,
        access_token: Option<&str>,
        force: bool,
    ) -> RemoteResult<()> {
        let request = self.prepare(Method::Delete, url, access_token, force);
        self.send(request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncResult;
    use crate::remote::etag::ETAG_NAMESPACE;
    use cachet_storage::{MemoryStorage, StorageProvider};
    use std::sync::Mutex;

    /// Replays canned responses and records what was sent.
    struct ScriptedTransport {
        responses: Mutex<Vec<TransportResponse>>,
        sent: Mutex<Vec<TransportRequest>>,
    }

    impl ScriptedTransport {
        fn new(mut responses: Vec<TransportResponse>) -> Arc<Self> {
            responses.reverse();
            Arc::new(Self {
                responses: Mutex::new(responses),
                sent: Mutex::new(Vec::new()),
            })
        }

        fn header(&self, index: usize, name: &str) -> Option<String> {
            self.sent.lock().unwrap()[index]
                .headers
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.clone())
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn execute(&self, request: TransportRequest) -> SyncResult<TransportResponse> {
            self.sent.lock().unwrap().push(request);
            Ok(self.responses.lock().unwrap().pop().unwrap())
        }
    }

    fn reply(status: u16, etag: Option<&str>, body: &str) -> TransportResponse {
        TransportResponse {
            status,
            reason: "reason".to_string(),
            etag: etag.map(str::to_owned),
            body: body.to_string(),
        }
    }

    fn client(transport: Arc<ScriptedTransport>) -> ConditionalClient {
        let etags = EtagCache::new(MemoryStorage::new().open(ETAG_NAMESPACE).unwrap());
        ConditionalClient::new(transport, etags)
    }

    const URL: &str = "http://remote/notes/a";

    #[tokio::test]
    async fn second_get_revalidates_with_etag() {
        let transport = ScriptedTransport::new(vec![
            reply(200, Some("\"v1\""), "hello"),
            reply(304, None, ""),
        ]);
        let client = client(Arc::clone(&transport));

        assert_eq!(client.get(URL, None, false).await.unwrap(), "hello");
        assert_eq!(client.get(URL, None, false).await, Err(StoreError::NotModified));

        assert_eq!(transport.header(0, "If-None-Match"), None);
        assert_eq!(transport.header(1, "If-None-Match").as_deref(), Some("\"v1\""));
    }

    #[tokio::test]
    async fn forced_get_skips_revalidation() {
        let transport = ScriptedTransport::new(vec![
            reply(200, Some("\"v1\""), "hello"),
            reply(200, Some("\"v1\""), "hello"),
        ]);
        let client = client(Arc::clone(&transport));

        client.get(URL, None, false).await.unwrap();
        client.get(URL, None, true).await.unwrap();
        assert_eq!(transport.header(1, "If-None-Match"), None);
    }

    #[tokio::test]
    async fn put_and_delete_send_if_match() {
        let transport = ScriptedTransport::new(vec![
            reply(200, Some("\"v1\""), "hello"),
            reply(204, Some("\"v2\""), ""),
            reply(204, None, ""),
        ]);
        let client = client(Arc::clone(&transport));

        client.get(URL, None, false).await.unwrap();
        assert_eq!(client.put(URL, None, "new", false).await.unwrap(), "new");
        client.delete(URL, None, false).await.unwrap();

        assert_eq!(transport.header(1, "If-Match").as_deref(), Some("\"v1\""));
        assert_eq!(transport.header(2, "If-Match").as_deref(), Some("\"v2\""));
    }

    #[tokio::test]
    async fn missing_etag_records_sentinel_and_sends_nothing() {
        let transport = ScriptedTransport::new(vec![
            reply(200, None, "hello"),
            reply(200, None, "hello"),
        ]);
        let client = client(Arc::clone(&transport));

        client.get(URL, None, false).await.unwrap();
        assert_eq!(client.etags().get(URL).as_deref(), Some(""));
        client.get(URL, None, false).await.unwrap();
        assert_eq!(transport.header(1, "If-None-Match"), None);
    }

    #[tokio::test]
    async fn failed_get_leaves_etag_untouched() {
        let transport = ScriptedTransport::new(vec![reply(500, Some("\"x\""), "boom")]);
        let client = client(transport);

        let err = client.get(URL, None, false).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(client.etags().get(URL), None);
    }

    #[tokio::test]
    async fn bearer_token_is_attached() {
        let transport = ScriptedTransport::new(vec![reply(200, None, "v")]);
        let client = client(Arc::clone(&transport));

        client.get(URL, Some("secret"), false).await.unwrap();
        assert_eq!(
            transport.header(0, "Authorization").as_deref(),
            Some("Bearer secret")
        );
    }
}
