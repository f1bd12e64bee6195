//! Outbound HTTP to the contact-import API
//!
//! [`UpstreamTransport`] is the seam between the relay and the network: a URL
//! goes in, the raw response body (or an error) comes out. Production uses
//! [`ReqwestTransport`]; tests plug in recording fakes.

use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;
use thiserror::Error;

use crate::models::UpstreamBody;

const USER_AGENT: &str = concat!("sponge-relay/", env!("CARGO_PKG_VERSION"));

/// Default upstream timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Upstream call failed
///
/// Messages never include the request URL, which carries credentials.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Upstream request failed: {0}")]
    Network(String),

    #[error("Upstream request timed out")]
    Timeout,

    #[error("Upstream returned HTTP {0}")]
    Status(u16),
}

/// Performs one GET against the upstream API
#[async_trait]
pub trait UpstreamTransport: Send + Sync {
    /// Fetch `url` and return its body unchanged
    async fn fetch(&self, url: &Url) -> Result<UpstreamBody, TransportError>;
}

/// reqwest-backed transport
pub struct ReqwestTransport {
    http_client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Network(e.without_url().to_string()))?;

        Ok(Self { http_client })
    }
}

fn classify(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Network(error.without_url().to_string())
    }
}

#[async_trait]
impl UpstreamTransport for ReqwestTransport {
    async fn fetch(&self, url: &Url) -> Result<UpstreamBody, TransportError> {
        let response = self
            .http_client
            .get(url.clone())
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(classify)?;
        Ok(UpstreamBody::new(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let transport = ReqwestTransport::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(transport.is_ok());
    }

    #[test]
    fn test_error_messages_are_generic() {
        assert_eq!(TransportError::Status(503).to_string(), "Upstream returned HTTP 503");
        assert_eq!(TransportError::Timeout.to_string(), "Upstream request timed out");
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error_without_url() {
        // Bind then drop to get a port nothing listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = ReqwestTransport::new(Duration::from_secs(2)).unwrap();
        let url = Url::parse(&format!(
            "http://{}/events/1?domain_key=K&domain_password=never-logged",
            addr
        ))
        .unwrap();

        let err = transport.fetch(&url).await.unwrap_err();
        assert!(matches!(err, TransportError::Network(_)));
        assert!(!err.to_string().contains("never-logged"));
    }
}
