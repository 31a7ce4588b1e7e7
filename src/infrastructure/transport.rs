// HTTP transport: one GET per request, no retries
use crate::error::TransportError;
use async_trait::async_trait;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET for a fully formed URI
    async fn get(&self, uri: &str) -> Result<HttpResponse, TransportError>;
}

#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::new("", e))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, uri: &str) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .get(uri)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| TransportError::new(uri, e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Request returned status {}", status);
        }

        let body = response
            .text()
            .await
            .map_err(|e| TransportError::new(uri, e))?;

        Ok(HttpResponse {
            status: status.as_u16(),
            body,
        })
    }
}
