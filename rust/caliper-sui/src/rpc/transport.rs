// JSON-RPC transport over HTTP

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::trace;

use crate::error::TransportError;

/// JSON-RPC request
#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: serde_json::Value,
    id: u64,
}

/// Stateless request/response exchange with a node.
///
/// Returns the parsed response body. A body carrying an `error` member is
/// still a successful exchange; interpreting it is up to the caller.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    async fn call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, TransportError>;
}

/// HTTP POST transport with a per-instance request id counter
pub struct HttpTransport {
    url: String,
    client: Client,
    request_id: AtomicU64,
}

impl HttpTransport {
    /// Create new transport
    pub fn new(url: &str, timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            url: url.to_string(),
            client: builder.build()?,
            request_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get next request ID
    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::SeqCst)
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, TransportError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: self.next_id(),
        };
        trace!(id = request.id, method, "rpc request");

        let response = self.client.post(&self.url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(TransportError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| TransportError::MalformedBody(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[test]
    fn test_transport_creation() {
        let transport = HttpTransport::new("http://127.0.0.1:9000", None).unwrap();
        assert_eq!(transport.url(), "http://127.0.0.1:9000");
    }

    #[test]
    fn test_request_id_increment() {
        let transport = HttpTransport::new("http://localhost", None).unwrap();
        assert_eq!(transport.next_id(), 1);
        assert_eq!(transport.next_id(), 2);
        assert_eq!(transport.next_id(), 3);
    }

    #[tokio::test]
    async fn test_posts_envelope_and_returns_body() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/")
                    .json_body(json!({
                        "jsonrpc": "2.0",
                        "method": "sui_getCoins",
                        "params": {"owner": "0x1"},
                        "id": 1
                    }));
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!({"jsonrpc": "2.0", "id": 1, "result": {"data": []}}));
            })
            .await;

        let transport = HttpTransport::new(&server.url("/"), None).unwrap();
        let body = transport
            .call("sui_getCoins", json!({"owner": "0x1"}))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(body["result"]["data"], json!([]));
    }

    #[tokio::test]
    async fn test_rpc_error_is_not_a_transport_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200)
                    .json_body(json!({"jsonrpc": "2.0", "id": 1, "error": {"code": -32000, "message": "boom"}}));
            })
            .await;

        let transport = HttpTransport::new(&server.url("/"), None).unwrap();
        let body = transport.call("sui_publish", json!([])).await.unwrap();
        assert_eq!(body["error"]["message"], "boom");
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(503).body("unavailable");
            })
            .await;

        let transport = HttpTransport::new(&server.url("/"), None).unwrap();
        let result = transport.call("sui_getCoins", json!({})).await;
        assert!(matches!(result, Err(TransportError::Status(503))));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200).body("<html>not json</html>");
            })
            .await;

        let transport = HttpTransport::new(&server.url("/"), None).unwrap();
        let result = transport.call("sui_getCoins", json!({})).await;
        assert!(matches!(result, Err(TransportError::MalformedBody(_))));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let transport =
            HttpTransport::new("http://127.0.0.1:1", Some(Duration::from_secs(2))).unwrap();
        let result = transport.call("sui_getCoins", json!({})).await;
        assert!(matches!(result, Err(TransportError::Connection(_))));
    }
}
