//! date_extract tool implementation.
//!
//! Extracts publication and modification dates from one HTML document.
//! No network I/O is performed unless `use_llm` is set.

use pagedate_client::{DateExtractor, LlmDateExtractor};
use pagedate_core::{DateResult, Error};
use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;

/// Input parameters for date_extract tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DateExtractParams {
    /// The raw HTML content to extract from.
    pub html: String,

    /// Ask the configured chat model instead of running the strategy waterfall.
    #[serde(default)]
    pub use_llm: bool,

    /// Source URL of the document (optional).
    /// Echoed in the output and passed to the model as context.
    #[serde(default)]
    pub url: Option<String>,
}

/// Output structure for date_extract tool.
#[derive(Debug, Clone, Serialize)]
pub struct DateExtractOutput {
    /// Source URL, when provided.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Engine that produced the result: "waterfall" or "llm".
    pub engine: &'static str,
    #[serde(flatten)]
    pub result: DateResult,
}

/// Implementation of the date_extract tool.
pub async fn extract_impl(
    extractor: &DateExtractor, llm: &LlmDateExtractor, params: DateExtractParams,
) -> Result<CallToolResult, McpError> {
    if params.html.trim().is_empty() {
        return Err(ToolError::from(Error::InvalidInput("html cannot be empty".into())).into());
    }

    let (engine, result) = if params.use_llm {
        let result = llm
            .extract(&params.html, params.url.as_deref())
            .await
            .map_err(ToolError::from)?;
        ("llm", result)
    } else {
        ("waterfall", extractor.extract(&params.html))
    };

    tracing::debug!(engine, url = params.url.as_deref().unwrap_or_default(), "date_extract completed");

    let output = DateExtractOutput { url: params.url, engine, result };

    Ok(CallToolResult::success(vec![Content::text(
        serde_json::to_string_pretty(&output).unwrap_or_default(),
    )]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagedate_core::LlmConfig;

    const OG_HTML: &str = r#"
        <!DOCTYPE html>
        <html>
        <head>
            <meta property="article:published_time" content="2025-11-14T18:00:00Z">
            <title>Test Article</title>
        </head>
        <body><p>Article body.</p></body>
        </html>
    "#;

    fn unreachable_llm() -> LlmDateExtractor {
        let config = LlmConfig { base_url: "http://127.0.0.1:9/v1".into(), ..Default::default() };
        LlmDateExtractor::new(config).unwrap()
    }

    fn output_json(result: &CallToolResult) -> serde_json::Value {
        let text = result
            .content
            .first()
            .and_then(|c| c.as_text())
            .map(|t| t.text.clone())
            .unwrap();
        serde_json::from_str(&text).unwrap()
    }

    #[tokio::test]
    async fn test_extract_open_graph_document() {
        let params = DateExtractParams {
            html: OG_HTML.into(),
            use_llm: false,
            url: Some("https://example.com/story".into()),
        };

        let result = extract_impl(&DateExtractor::default(), &unreachable_llm(), params)
            .await
            .unwrap();
        assert!(!result.is_error.unwrap_or(false));

        let json = output_json(&result);
        assert_eq!(json["engine"], "waterfall");
        assert_eq!(json["url"], "https://example.com/story");
        assert_eq!(json["published_date"], "2025-11-14");
        assert_eq!(json["published_method"], "open_graph");
        assert_eq!(json["pub_confidence"], "high");
    }

    #[tokio::test]
    async fn test_extract_empty_html_fails() {
        let params = DateExtractParams { html: "  ".into(), use_llm: false, url: None };

        let result = extract_impl(&DateExtractor::default(), &unreachable_llm(), params).await;
        let err = result.unwrap_err();
        assert_eq!(err.code.0, -32602);
    }

    #[tokio::test]
    async fn test_extract_llm_unreachable_degrades() {
        let params = DateExtractParams { html: OG_HTML.into(), use_llm: true, url: None };

        let result = extract_impl(&DateExtractor::default(), &unreachable_llm(), params)
            .await
            .unwrap();

        let json = output_json(&result);
        assert_eq!(json["engine"], "llm");
        assert_eq!(json["published_method"], "llm (not found)");
        assert_eq!(json["pub_confidence"], "low");
        assert!(json.get("url").is_none());
    }

    #[tokio::test]
    async fn test_extract_llm_closed_session() {
        let llm = unreachable_llm();
        llm.close();
        let params = DateExtractParams { html: OG_HTML.into(), use_llm: true, url: None };

        let err = extract_impl(&DateExtractor::default(), &llm, params).await.unwrap_err();
        assert_eq!(err.code.0, -32003);
    }
}
