//! Client for the upstream Anthropic Messages API.
//!
//! Sends the caller's raw bytes with the server-side credential attached and
//! hands back whatever status and body the upstream produced.

use axum::body::Bytes;
use axum::http::StatusCode;
use reqwest::{header, Client};
use std::time::Duration;

use crate::config::ApiKey;

/// Sized for requests carrying whole PDF documents.
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(120);

/// Status and body exactly as the upstream returned them.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
    messages_url: String,
}

impl UpstreamClient {
    pub fn new(messages_url: impl Into<String>) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(UPSTREAM_TIMEOUT).build()?;

        Ok(Self {
            client,
            messages_url: messages_url.into(),
        })
    }

    pub fn messages_url(&self) -> &str {
        &self.messages_url
    }

    /// Issue exactly one POST upstream. No retries.
    pub async fn forward(&self, api_key: &ApiKey, body: Bytes) -> reqwest::Result<UpstreamResponse> {
        let response = self
            .client
            .post(&self.messages_url)
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-api-key", api_key.expose())
            .header("anthropic-version", shared::ANTHROPIC_VERSION)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        Ok(UpstreamResponse { status, body })
    }
}
