//! LLM alternate date extractor.
//!
//! Asks a chat model for both dates under a strict tagged-JSON grammar and
//! maps the answer onto the same [`DateResult`] the waterfall produces.
//!
//! ### Retry Behavior
//!
//! - **Endpoint**: OpenAI-compatible `POST {base_url}/chat/completions`.
//! - **Attempts**: up to `max_attempts` sequential attempts per document.
//!   Transport and schema failures both consume one attempt; the same prompt
//!   is resent without backoff.
//! - **Exhaustion**: returns [`DateResult::llm_exhausted`], never an error.
//! - **Concurrency**: a shared semaphore caps in-flight requests across all
//!   documents using one extractor.

pub mod error;
pub mod request;
pub mod response;
pub mod transport;

pub use error::LlmError;
pub use request::{ChatMessage, ChatRequest, build_prompt};
pub use response::{ChatResponse, LlmReply, parse_reply};
pub use transport::{ChatTransport, HttpChatTransport};

use std::sync::Arc;

use async_trait::async_trait;
use pagedate_core::{DateResult, Error, LlmConfig};
use tokio::sync::Semaphore;

use crate::extract::Extractor;

/// Chat-model date extractor.
pub struct LlmDateExtractor {
    transport: Arc<dyn ChatTransport>,
    config: LlmConfig,
    permits: Arc<Semaphore>,
}

impl LlmDateExtractor {
    /// Create an extractor talking to the configured HTTP endpoint.
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let transport = HttpChatTransport::new(&config)?;
        Ok(Self::with_transport(Arc::new(transport), config))
    }

    pub fn with_transport(transport: Arc<dyn ChatTransport>, config: LlmConfig) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_concurrency.max(1)));
        Self { transport, config, permits }
    }

    /// Stop accepting extraction calls. In-flight attempts finish normally.
    pub fn close(&self) {
        self.permits.close();
    }

    pub fn is_closed(&self) -> bool {
        self.permits.is_closed()
    }

    /// Extract both dates from `html`, optionally telling the model its URL.
    ///
    /// # Errors
    ///
    /// Only `LlmError::SessionClosed`, when called after [`close`](Self::close).
    /// Every other failure is retried and finally degrades to
    /// [`DateResult::llm_exhausted`].
    pub async fn extract(&self, html: &str, url: Option<&str>) -> Result<DateResult, LlmError> {
        if self.is_closed() {
            return Err(LlmError::SessionClosed);
        }

        let request = ChatRequest::for_document(&self.config, html, url);
        let attempts = self.config.max_attempts;

        for attempt in 1..=attempts {
            let _permit = self.permits.acquire().await.map_err(|_| LlmError::SessionClosed)?;

            match self.attempt(&request).await {
                Ok(reply) => {
                    let result = reply.into_result();
                    tracing::info!(
                        attempt,
                        published = %result.published_method(),
                        modified = %result.modified_method(),
                        "llm extraction succeeded"
                    );
                    return Ok(result);
                }
                Err(e) if e.is_attempt_failure() => {
                    tracing::warn!(attempt, max_attempts = attempts, error = %e, "llm attempt failed, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        tracing::error!(url = url.unwrap_or_default(), "{}", Error::Exhausted { attempts });
        Ok(DateResult::llm_exhausted())
    }

    async fn attempt(&self, request: &ChatRequest) -> Result<LlmReply, LlmError> {
        let content = self.transport.complete(request).await?;
        parse_reply(content.trim())
    }
}

#[async_trait]
impl Extractor for LlmDateExtractor {
    async fn extract_dates(&self, html: &str, url: Option<&str>) -> Result<DateResult, Error> {
        self.extract(html, url).await.map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagedate_core::{Confidence, ExtractionMethod, LlmSource};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::task::JoinSet;

    const GOOD: &str = r#"<JSON>{"published_date": "2025-11-14", "pub_extraction_method": "json-ld",
        "modified_date": null, "mod_extraction_method": null}</JSON>"#;

    /// Replays scripted replies in order, then answers without a block.
    struct Scripted {
        replies: Mutex<VecDeque<Result<String, LlmError>>>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(replies: Vec<Result<String, LlmError>>) -> Arc<Self> {
            Arc::new(Self { replies: Mutex::new(replies.into()), calls: AtomicUsize::new(0) })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChatTransport for Scripted {
        async fn complete(&self, _req: &ChatRequest) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok("no block".to_string()))
        }
    }

    /// Tracks the highest number of concurrent calls.
    #[derive(Default)]
    struct Gauge {
        current: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl ChatTransport for Gauge {
        async fn complete(&self, _req: &ChatRequest) -> Result<String, LlmError> {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.current.fetch_sub(1, Ordering::SeqCst);
            Ok(GOOD.to_string())
        }
    }

    #[tokio::test]
    async fn test_exhausted_after_three_missing_blocks() {
        let transport = Scripted::new(vec![
            Ok("plain text".into()),
            Ok("still no tags".into()),
            Ok("```json {}```".into()),
        ]);
        let extractor = LlmDateExtractor::with_transport(transport.clone(), LlmConfig::default());

        let result = extractor.extract("<html></html>", None).await.unwrap();

        assert_eq!(transport.calls(), 3);
        assert_eq!(result, DateResult::llm_exhausted());
        assert_eq!(result.published_method().as_str(), "llm (not found)");
        assert_eq!(result.modified_method().as_str(), "llm (not found)");
        assert_eq!(result.pub_confidence(), Confidence::Low);
        assert_eq!(result.mod_confidence(), Confidence::Low);
        assert!(result.dates_found().is_empty());
        assert_eq!(result.last_date_found(), None);
    }

    #[tokio::test]
    async fn test_transport_failure_then_success() {
        let transport = Scripted::new(vec![Err(LlmError::Http { status: 502 }), Ok(GOOD.into())]);
        let extractor = LlmDateExtractor::with_transport(transport.clone(), LlmConfig::default());

        let result = extractor.extract("<html></html>", Some("https://example.com")).await.unwrap();

        assert_eq!(transport.calls(), 2);
        assert_eq!(result.published_method(), ExtractionMethod::Llm(Some(LlmSource::JsonLd)));
        assert_eq!(result.pub_confidence(), Confidence::High);
        assert_eq!(result.published_raw(), Some("2025-11-14"));
    }

    #[tokio::test]
    async fn test_schema_violation_is_retried() {
        let bad_method = r#"<JSON>{"published_date": "2025-11-14", "pub_extraction_method": "rss",
            "modified_date": null, "mod_extraction_method": null}</JSON>"#;
        let transport = Scripted::new(vec![Ok(bad_method.into()), Ok(GOOD.into())]);
        let extractor = LlmDateExtractor::with_transport(transport.clone(), LlmConfig::default());

        let result = extractor.extract("<html></html>", None).await.unwrap();
        assert_eq!(transport.calls(), 2);
        assert_eq!(result.published_date(), chrono::NaiveDate::from_ymd_opt(2025, 11, 14));
    }

    #[tokio::test]
    async fn test_max_attempts_honored() {
        let transport = Scripted::new(vec![Err(LlmError::Timeout)]);
        let config = LlmConfig { max_attempts: 1, ..Default::default() };
        let extractor = LlmDateExtractor::with_transport(transport.clone(), config);

        let result = extractor.extract("<html></html>", None).await.unwrap();
        assert_eq!(transport.calls(), 1);
        assert_eq!(result, DateResult::llm_exhausted());
    }

    #[tokio::test]
    async fn test_closed_session_is_an_error() {
        let transport = Scripted::new(vec![Ok(GOOD.into())]);
        let extractor = LlmDateExtractor::with_transport(transport.clone(), LlmConfig::default());
        extractor.close();

        let err = extractor.extract("<html></html>", None).await.unwrap_err();
        assert!(matches!(err, LlmError::SessionClosed));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_concurrency_ceiling() {
        let gauge = Arc::new(Gauge::default());
        let config = LlmConfig { max_concurrency: 2, ..Default::default() };
        let extractor = Arc::new(LlmDateExtractor::with_transport(gauge.clone(), config));

        let mut set = JoinSet::new();
        for _ in 0..6 {
            let extractor = extractor.clone();
            set.spawn(async move { extractor.extract("<html></html>", None).await });
        }
        while let Some(joined) = set.join_next().await {
            assert!(joined.unwrap().is_ok());
        }

        assert!(gauge.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_extractor_trait() {
        let transport = Scripted::new(vec![Ok(GOOD.into())]);
        let extractor: Box<dyn Extractor> =
            Box::new(LlmDateExtractor::with_transport(transport, LlmConfig::default()));

        let result = extractor.extract_dates("<html></html>", None).await.unwrap();
        assert_eq!(result.published_method().as_str(), "llm (json-ld)");
    }

    #[tokio::test]
    async fn test_http_end_to_end_retries() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&server)
            .await;

        let config = LlmConfig { base_url: format!("{}/v1", server.uri()), ..Default::default() };
        let extractor = LlmDateExtractor::new(config).unwrap();

        let result = extractor.extract("<html></html>", None).await.unwrap();
        assert_eq!(result, DateResult::llm_exhausted());
    }
}
