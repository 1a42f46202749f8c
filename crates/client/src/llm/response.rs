//! Chat completions response types and reply validation.
//!
//! [`parse_reply`] is pure: it takes the message content and either returns a
//! validated [`LlmReply`] or the failure that should cost one attempt.

use std::str::FromStr;
use std::sync::LazyLock;

use pagedate_core::{DateResult, ExtractionMethod, FieldDate, LlmSource};
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::error::LlmError;
use crate::extract::normalize;

/// Raw response from a chat completions endpoint.
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatResponse {
    /// Text of `choices[0].message.content`.
    pub fn into_content(self) -> Result<String, LlmError> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::NonJson("missing choices[0].message.content".to_string()))
    }
}

static JSON_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<JSON>(.*?)</JSON>").expect("valid json block regex"));

const REQUIRED_KEYS: [&str; 4] = ["published_date", "pub_extraction_method", "modified_date", "mod_extraction_method"];

/// Validated model answer for both fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmReply {
    pub published: FieldDate,
    pub modified: FieldDate,
}

impl LlmReply {
    pub fn into_result(self) -> DateResult {
        DateResult::new(self.published, self.modified, Vec::new())
    }
}

/// Extract and validate the `<JSON>` block from a model reply.
///
/// # Errors
///
/// - `MissingBlock` when no `<JSON>...</JSON>` pair is present
/// - `InvalidJson` when the block is not a JSON object
/// - `Schema` when a key is missing, a method is outside
///   `{json-ld, meta-tags, html-body, null}`, a dated field has a null
///   method, or a date does not normalize
pub fn parse_reply(content: &str) -> Result<LlmReply, LlmError> {
    let caps = JSON_BLOCK.captures(content).ok_or(LlmError::MissingBlock)?;
    let value: Value = serde_json::from_str(caps[1].trim()).map_err(|e| LlmError::InvalidJson(e.to_string()))?;
    let object = value
        .as_object()
        .ok_or_else(|| LlmError::InvalidJson("block is not a JSON object".to_string()))?;

    if let Some(missing) = REQUIRED_KEYS.iter().find(|k| !object.contains_key(**k)) {
        return Err(LlmError::Schema(format!("missing key {missing}")));
    }

    Ok(LlmReply {
        published: field(object, "published_date", "pub_extraction_method")?,
        modified: field(object, "modified_date", "mod_extraction_method")?,
    })
}

fn nullable_str<'a>(object: &'a Map<String, Value>, key: &str) -> Result<Option<&'a str>, LlmError> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(LlmError::Schema(format!("{key} must be a string or null, got {other}"))),
    }
}

fn field(object: &Map<String, Value>, date_key: &str, method_key: &str) -> Result<FieldDate, LlmError> {
    let date = nullable_str(object, date_key)?;
    let source = nullable_str(object, method_key)?
        .map(|m| LlmSource::from_str(m).map_err(LlmError::Schema))
        .transpose()?;

    match (date, source) {
        (Some(raw), Some(source)) => {
            let parsed = normalize(raw).map_err(|e| LlmError::Schema(format!("{date_key}: {e}")))?;
            Ok(FieldDate::found(parsed, ExtractionMethod::Llm(Some(source)), raw))
        }
        (Some(raw), None) => Err(LlmError::Schema(format!("{date_key} is {raw} but {method_key} is null"))),
        (None, _) => Ok(FieldDate { date: None, method: ExtractionMethod::Llm(None), raw: None }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pagedate_core::Confidence;

    const GOOD_REPLY: &str = r#"Sure, here it is.
<JSON>
{
    "published_date": "2025-11-14",
    "pub_extraction_method": "json-ld",
    "modified_date": "2025-11-15",
    "mod_extraction_method": "meta-tags"
}
</JSON>"#;

    #[test]
    fn test_parse_reply_success() {
        let reply = parse_reply(GOOD_REPLY).unwrap();
        assert_eq!(reply.published.date, NaiveDate::from_ymd_opt(2025, 11, 14));
        assert_eq!(reply.published.method, ExtractionMethod::Llm(Some(LlmSource::JsonLd)));
        assert_eq!(reply.modified.method, ExtractionMethod::Llm(Some(LlmSource::MetaTags)));

        let result = reply.into_result();
        assert_eq!(result.pub_confidence(), Confidence::High);
        assert_eq!(result.mod_confidence(), Confidence::Medium);
        assert_eq!(result.last_date_found(), NaiveDate::from_ymd_opt(2025, 11, 15));
        assert_eq!(result.published_method().as_str(), "llm (json-ld)");
    }

    #[test]
    fn test_parse_reply_null_fields() {
        let content = r#"<JSON>{"published_date": null, "pub_extraction_method": null,
            "modified_date": "2024-02-02", "mod_extraction_method": "html-body"}</JSON>"#;
        let result = parse_reply(content).unwrap().into_result();

        assert_eq!(result.published_date(), None);
        assert_eq!(result.published_method().as_str(), "llm (not found)");
        assert_eq!(result.pub_confidence(), Confidence::Low);
        assert_eq!(result.mod_confidence(), Confidence::Low);
        assert_eq!(result.dates_found().len(), 1);
    }

    #[test]
    fn test_parse_reply_missing_block() {
        assert!(matches!(parse_reply("no tags here"), Err(LlmError::MissingBlock)));
        // lowercase tags are not the grammar
        assert!(matches!(parse_reply("<json>{}</json>"), Err(LlmError::MissingBlock)));
    }

    #[test]
    fn test_parse_reply_invalid_json() {
        assert!(matches!(parse_reply("<JSON>{not json</JSON>"), Err(LlmError::InvalidJson(_))));
        assert!(matches!(parse_reply("<JSON>[1, 2]</JSON>"), Err(LlmError::InvalidJson(_))));
    }

    #[test]
    fn test_parse_reply_missing_key() {
        let content = r#"<JSON>{"published_date": null, "pub_extraction_method": null, "modified_date": null}</JSON>"#;
        assert!(matches!(parse_reply(content), Err(LlmError::Schema(_))));
    }

    #[test]
    fn test_parse_reply_out_of_set_method() {
        let content = r#"<JSON>{"published_date": "2020-01-01", "pub_extraction_method": "guess",
            "modified_date": null, "mod_extraction_method": null}</JSON>"#;
        assert!(matches!(parse_reply(content), Err(LlmError::Schema(_))));
    }

    #[test]
    fn test_parse_reply_date_without_method() {
        let content = r#"<JSON>{"published_date": "2020-01-01", "pub_extraction_method": null,
            "modified_date": null, "mod_extraction_method": null}</JSON>"#;
        assert!(matches!(parse_reply(content), Err(LlmError::Schema(_))));
    }

    #[test]
    fn test_parse_reply_unparseable_date() {
        let content = r#"<JSON>{"published_date": "sometime", "pub_extraction_method": "html-body",
            "modified_date": null, "mod_extraction_method": null}</JSON>"#;
        assert!(matches!(parse_reply(content), Err(LlmError::Schema(_))));
    }

    #[test]
    fn test_chat_response_content() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"hello"}}]}"#;
        let response: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.into_content().unwrap(), "hello");

        let empty: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(empty.into_content(), Err(LlmError::NonJson(_))));
    }
}
