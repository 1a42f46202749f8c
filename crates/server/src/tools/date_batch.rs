//! date_batch tool implementation.
//!
//! Runs deterministic extraction over many documents in parallel with bounded
//! concurrency and, when a cutoff is given, reports which pages fall on or
//! before it. Parsing runs on the blocking pool.

use std::sync::Arc;

use chrono::NaiveDate;
use pagedate_client::DateExtractor;
use pagedate_core::{DateResult, Error};
use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::error::ToolError;

/// One document in a batch.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BatchDocument {
    /// Source URL, used to identify the item in the output.
    pub url: String,
    /// The raw HTML content.
    pub html: String,
}

/// Input parameters for date_batch tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DateBatchParams {
    /// Documents to extract dates from.
    pub documents: Vec<BatchDocument>,

    /// Cutoff date (YYYY-MM-DD). A page is on or before the cutoff when its
    /// latest date found is not after it.
    #[serde(default)]
    pub cutoff: Option<String>,

    /// Maximum number of documents processed at once (default: 4, max: 16).
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: Option<u8>,
}

fn default_max_concurrency() -> Option<u8> {
    Some(4)
}

/// Individual batch result item.
#[derive(Debug, Clone, Serialize)]
pub struct BatchItem {
    /// The document URL.
    pub url: String,
    /// Extraction result.
    pub result: DateResult,
    /// Cutoff decision (only when a cutoff was given).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_or_before_cutoff: Option<bool>,
}

/// Batch summary statistics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    /// Total number of documents processed.
    pub total: u32,
    /// Documents with a published date.
    pub with_published: u32,
    /// Documents with a modified date.
    pub with_modified: u32,
    /// Documents without any date at all.
    pub undated: u32,
    /// Documents on or before the cutoff (only when a cutoff was given).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_or_before_cutoff: Option<u32>,
}

/// Output structure for date_batch tool.
#[derive(Debug, Clone, Serialize)]
pub struct DateBatchOutput {
    /// Individual results for each document (in input order).
    pub results: Vec<BatchItem>,
    /// Summary statistics.
    pub summary: BatchSummary,
}

fn parse_cutoff(raw: &str) -> Result<NaiveDate, ToolError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| ToolError::from(Error::InvalidInput(format!("cutoff must be YYYY-MM-DD: {e}"))))
}

/// Implementation of the date_batch tool.
pub async fn batch_impl(extractor: &Arc<DateExtractor>, params: DateBatchParams) -> Result<CallToolResult, McpError> {
    let output = run_batch(extractor, params).await?;
    Ok(CallToolResult::success(vec![Content::text(
        serde_json::to_string_pretty(&output).unwrap_or_default(),
    )]))
}

async fn run_batch(extractor: &Arc<DateExtractor>, params: DateBatchParams) -> Result<DateBatchOutput, ToolError> {
    if params.documents.is_empty() {
        return Err(Error::InvalidInput("documents cannot be empty".into()).into());
    }

    let cutoff = params.cutoff.as_deref().map(parse_cutoff).transpose()?;

    let max_concurrency = params.max_concurrency.unwrap_or(4).min(16) as usize;
    if max_concurrency == 0 {
        return Err(Error::InvalidInput("max_concurrency must be at least 1".into()).into());
    }

    let semaphore = Arc::new(Semaphore::new(max_concurrency));
    let mut join_set = JoinSet::new();

    for (index, BatchDocument { url, html }) in params.documents.into_iter().enumerate() {
        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| ToolError::ExtractFailed(e.to_string()))?;
        let extractor = extractor.clone();

        join_set.spawn(async move {
            let _permit = permit;
            let result = tokio::task::spawn_blocking(move || extractor.extract(&html)).await;
            (index, url, result)
        });
    }

    let mut items: Vec<(usize, BatchItem)> = Vec::new();
    let mut summary = BatchSummary { on_or_before_cutoff: cutoff.map(|_| 0), ..Default::default() };

    while let Some(joined) = join_set.join_next().await {
        let (index, url, result) = joined.map_err(|e| ToolError::ExtractFailed(e.to_string()))?;
        let result = result.map_err(|e| ToolError::ExtractFailed(e.to_string()))?;

        summary.total += 1;
        if result.published_date().is_some() {
            summary.with_published += 1;
        }
        if result.modified_date().is_some() {
            summary.with_modified += 1;
        }
        if result.dates_found().is_empty() {
            summary.undated += 1;
        }

        let on_or_before_cutoff = cutoff.map(|c| result.is_on_or_before(c));
        if on_or_before_cutoff == Some(true)
            && let Some(count) = summary.on_or_before_cutoff.as_mut()
        {
            *count += 1;
        }

        items.push((index, BatchItem { url, result, on_or_before_cutoff }));
    }

    items.sort_by_key(|(index, _)| *index);
    let results = items.into_iter().map(|(_, item)| item).collect();

    tracing::info!(total = summary.total, with_published = summary.with_published, "date_batch completed");

    Ok(DateBatchOutput { results, summary })
}
