//! Network seam for the LLM extractor.

use std::sync::Arc;

use async_trait::async_trait;
use pagedate_core::LlmConfig;
use reqwest::header;

use super::error::LlmError;
use super::request::ChatRequest;
use super::response::ChatResponse;

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "pagedate/0.1";

/// One chat completion round trip.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send `req` and return the assistant message content.
    async fn complete(&self, req: &ChatRequest) -> Result<String, LlmError>;
}

/// reqwest-backed transport for OpenAI-compatible endpoints.
#[derive(Debug, Clone)]
pub struct HttpChatTransport {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpChatTransport {
    /// Build a pooled client with the configured timeout.
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()
            .map_err(|e| LlmError::Network(Arc::new(e)))?;

        Ok(Self { http, endpoint: config.endpoint(), api_key: config.api_key.clone() })
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn complete(&self, req: &ChatRequest) -> Result<String, LlmError> {
        let mut builder = self
            .http
            .post(&self.endpoint)
            .header(header::ACCEPT, "application/json")
            .json(req);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();
        tracing::debug!(%status, endpoint = %self.endpoint, "chat completion response");

        if status.is_client_error() || status.is_server_error() {
            return Err(LlmError::Http { status: status.as_u16() });
        }

        let body = response.text().await?;
        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| LlmError::NonJson(e.to_string()))?;
        parsed.into_content()
    }
}
