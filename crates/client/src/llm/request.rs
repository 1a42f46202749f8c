//! Chat completions request types and the date extraction prompt.

use pagedate_core::LlmConfig;
use serde::Serialize;

/// Request body for an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// One chat turn.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

const PROMPT_HEAD: &str = r#"Role:
You are an expert HTML parser and data extraction agent. Analyze the raw HTML below and extract the published_date and the modified_date.
Identify the source method used for each date field independently.

Extraction rules:
For published_date and modified_date individually, search sources in this strict priority order. Once a valid date is found in a higher priority source, stop and report that source as the extraction method.
- Priority 1: json-ld (datePublished/dateModified in <script type="application/ld+json">).
- Priority 2: meta-tags (article:published_time, og:updated_time and similar).
- Priority 3: html-body (visible text like "Posted on" or "Last updated", or <time> elements).

Independence: the published_date may come from json-ld while the modified_date comes from html-body.
Formatting: convert every extracted date to YYYY-MM-DD.

Null values:
- If a date is not found, set the date value to null.
- If a date is null, set its extraction method to null.

Output format:
Wrap the result in <JSON> and </JSON> tags. Do not use markdown code blocks. Output exactly this structure:

<JSON>
{
    "published_date": "YYYY-MM-DD" or null,
    "pub_extraction_method": "json-ld" or "meta-tags" or "html-body" or null,
    "modified_date": "YYYY-MM-DD" or null,
    "mod_extraction_method": "json-ld" or "meta-tags" or "html-body" or null
}
</JSON>
"#;

/// Instruction prompt embedding the raw HTML and, when known, its URL.
pub fn build_prompt(html: &str, url: Option<&str>) -> String {
    let mut prompt = format!("{PROMPT_HEAD}\nInput HTML: [{html}]\n");
    if let Some(url) = url {
        prompt.push_str(&format!("Provided URL: {url}\n"));
    }
    prompt
}

impl ChatRequest {
    /// Single-turn date extraction request.
    pub fn for_document(config: &LlmConfig, html: &str, url: Option<&str>) -> Self {
        Self {
            model: config.model.clone(),
            messages: vec![ChatMessage::user(build_prompt(html, url))],
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}
