//! reqwest-backed query transport

use async_trait::async_trait;
use std::time::Duration;

use alongtrack_core::error::{AlongTrackError, Result};
use alongtrack_core::ports::QueryTransport;

/// Posts Overpass QL as the request body over HTTP(S)
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("alongtrack/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AlongTrackError::ConfigInvalid {
                key: "overpass.timeout_secs".to_string(),
                reason: format!("Failed to build HTTP client: {}", e),
            })?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl QueryTransport for ReqwestTransport {
    async fn post(&self, endpoint: &str, query: &str) -> Result<String> {
        let transport_error = |reason: String| AlongTrackError::TransportFailure {
            attempts: 1,
            last_error: format!("{}: {}", endpoint, reason),
        };

        let response = self
            .client
            .post(endpoint)
            .body(query.to_string())
            .send()
            .await
            .map_err(|e| transport_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(transport_error(format!("HTTP {}", status)));
        }

        response.text().await.map_err(|e| transport_error(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_creation() {
        assert!(ReqwestTransport::new(Duration::from_secs(60)).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_failure() {
        let transport = ReqwestTransport::new(Duration::from_secs(2)).unwrap();
        // Port 9 (discard) on localhost is not expected to serve HTTP
        let err = transport.post("http://127.0.0.1:9/api/interpreter", "[out:json];").await;
        assert!(matches!(err, Err(AlongTrackError::TransportFailure { .. })));
    }
}
