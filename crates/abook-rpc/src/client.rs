//! HTTP client for RPC calls.

use std::time::Duration;

use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument, trace};

use abook_core::error::{ConnectionError, Error, ProtocolError};
use abook_core::{Result, ServiceUrl};

use crate::endpoints::{ErrorResponse, PEER_HEADER};

/// Per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client bound to one service endpoint and peer id.
#[derive(Debug, Clone)]
pub struct RpcClient {
    client: reqwest::Client,
    url: ServiceUrl,
    peer: String,
    timeout: Duration,
}

impl RpcClient {
    /// Create a client for the given service.
    pub fn new(url: ServiceUrl, peer: impl Into<String>) -> Result<Self> {
        Self::with_timeout(url, peer, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(
        url: ServiceUrl,
        peer: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("abook/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| ConnectionError::Http {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            url,
            peer: peer.into(),
            timeout,
        })
    }

    /// Returns the service URL this client talks to.
    pub fn url(&self) -> &ServiceUrl {
        &self.url
    }

    /// Returns the peer id sent with every call.
    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Invoke a method and decode its response.
    #[instrument(skip(self, body), fields(url = %self.url))]
    pub async fn call<B, R>(&self, method: &str, body: &B) -> Result<R>
    where
        B: Serialize + std::fmt::Debug,
        R: DeserializeOwned,
    {
        let url = self.url.rpc_url(method);
        debug!(method, "RPC call");
        trace!(?body, "request body");

        let response = self
            .client
            .post(&url)
            .header(PEER_HEADER, &self.peer)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.handle_response(response).await
    }

    /// Decode a response body or rebuild the service's error.
    async fn handle_response<R: DeserializeOwned>(&self, response: reqwest::Response) -> Result<R> {
        let status = response.status();
        trace!(status = %status, "RPC response");

        if !status.is_success() {
            return Err(self.parse_error_response(response).await);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;
        serde_json::from_slice(&bytes).map_err(|e| {
            ProtocolError::new(
                status.as_u16(),
                None,
                Some(format!("invalid response body: {}", e)),
            )
            .into()
        })
    }

    async fn parse_error_response(&self, response: reqwest::Response) -> Error {
        let status = response.status().as_u16();

        match response.json::<ErrorResponse>().await {
            Ok(body) => Error::from_code(status, body.error.as_deref(), body.message),
            Err(_) => ProtocolError::new(status, None, None).into(),
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> Error {
        let error = if err.is_timeout() {
            ConnectionError::Timeout {
                duration_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }
        } else if err.is_connect() {
            ConnectionError::Connect {
                message: err.to_string(),
            }
        } else {
            ConnectionError::Http {
                message: err.to_string(),
            }
        };
        error.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let url = ServiceUrl::new("http://127.0.0.1:8642").unwrap();
        let client = RpcClient::new(url.clone(), "peer-1").unwrap();
        assert_eq!(client.url().as_str(), url.as_str());
        assert_eq!(client.peer(), "peer-1");
    }
}
