//! Publication and modification date extraction.
//!
//! ### Waterfall
//! - Two independent runs over one parsed document, one per [`Field`].
//! - Fixed strategy order; the first strategy with a normalizable candidate wins.
//!
//! ### Aggregation
//! - A broad regex sweep of text and meta attributes feeds `dates_found`.
//! - Field dates are merged in and `last_date_found` is the maximum.
//!
//! ### Stable Abstraction
//! - [`Extractor`] is implemented by both the deterministic [`DateExtractor`]
//!   and the LLM extractor so callers can swap one for the other.

pub mod aggregate;
pub mod document;
pub mod inference;
pub mod normalize;
pub mod strategy;
pub mod waterfall;

pub use aggregate::aggregate;
pub use document::Document;
pub use inference::{DateInference, HeuristicInference};
pub use normalize::normalize;
pub use strategy::{Field, Found, Strategy};
pub use waterfall::Waterfall;

use std::sync::Arc;

use async_trait::async_trait;
use pagedate_core::{AppConfig, DateResult, Error, ExtractionMethod};

/// Configuration for deterministic extraction.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Run the inference fallback after every structural strategy (default: true)
    pub use_inference: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self { use_inference: true }
    }
}

impl From<&AppConfig> for ExtractConfig {
    fn from(config: &AppConfig) -> Self {
        Self { use_inference: config.use_inference }
    }
}

/// Stable extractor trait shared by every date extraction engine.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extract both dates from one HTML document.
    ///
    /// `url` is context for engines that can use it; others ignore it.
    async fn extract_dates(&self, html: &str, url: Option<&str>) -> Result<DateResult, Error>;
}

/// Deterministic strategy-waterfall extractor.
pub struct DateExtractor {
    waterfall: Waterfall,
}

impl DateExtractor {
    pub fn new(config: &ExtractConfig) -> Self {
        let inference: Option<Arc<dyn DateInference>> = if config.use_inference {
            Some(Arc::new(HeuristicInference::new()))
        } else {
            None
        };
        Self { waterfall: Waterfall::standard(inference) }
    }

    /// Standard waterfall ending with a custom inference engine.
    pub fn with_inference(engine: Arc<dyn DateInference>) -> Self {
        Self { waterfall: Waterfall::standard(Some(engine)) }
    }

    pub fn from_app_config(config: &AppConfig) -> Self {
        Self::new(&ExtractConfig::from(config))
    }

    /// Methods in the order they are tried.
    pub fn methods(&self) -> Vec<ExtractionMethod> {
        self.waterfall.order()
    }

    /// Extract dates from raw HTML.
    ///
    /// Never fails: a document that cannot be parsed yields
    /// [`DateResult::not_found`].
    pub fn extract(&self, html: &str) -> DateResult {
        let doc = match Document::parse(html) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(error = %e, "could not parse document");
                return DateResult::not_found();
            }
        };

        let published = self.waterfall.run(&doc, Field::Published);
        let modified = self.waterfall.run(&doc, Field::Modified);
        let dates_found = aggregate(&doc);
        let result = DateResult::new(published, modified, dates_found);

        match result.published_date() {
            Some(date) => tracing::info!(%date, method = %result.published_method(), "found published date"),
            None => tracing::warn!("no published date found"),
        }
        match result.modified_date() {
            Some(date) => tracing::info!(%date, method = %result.modified_method(), "found modified date"),
            None => tracing::debug!("no modified date found"),
        }

        result
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new(&ExtractConfig::default())
    }
}

#[async_trait]
impl Extractor for DateExtractor {
    async fn extract_dates(&self, html: &str, _url: Option<&str>) -> Result<DateResult, Error> {
        Ok(self.extract(html))
    }
}

/// Extract dates from HTML using the default extractor.
///
/// This is a convenience function that uses the standard waterfall with
/// heuristic inference enabled.
pub fn extract_dates(html: &str) -> DateResult {
    DateExtractor::default().extract(html)
}
