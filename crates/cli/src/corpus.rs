//! Scraped corpus input and cutoff output records.
//!
//! Input is a JSON array of crawl batches, each holding `content_results`:
//!
//! ```json
//! [{"content_results": [{"url": "https://...", "text": "<html>...", "success": true}]}]
//! ```
//!
//! Output is a JSON array of [`CutoffRecord`].

use chrono::NaiveDate;
use pagedate_core::DateResult;
use serde::{Deserialize, Serialize};

/// One crawl batch.
#[derive(Debug, Clone, Deserialize)]
pub struct CorpusBatch {
    #[serde(default)]
    pub content_results: Vec<ContentRecord>,
}

/// One fetched page.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentRecord {
    pub url: String,
    /// Raw HTML; absent for failed fetches.
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub success: bool,
}

impl ContentRecord {
    /// HTML of a successful fetch.
    pub fn html(&self) -> Option<&str> {
        if self.success { self.text.as_deref() } else { None }
    }
}

/// A page kept by the cutoff filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CutoffRecord {
    pub url: String,
    pub published_date: Option<NaiveDate>,
    pub modified_date: Option<NaiveDate>,
    pub last_date_found: NaiveDate,
}

impl CutoffRecord {
    /// Keep `result` when its latest date is on or before `cutoff`.
    pub fn keep(url: &str, result: &DateResult, cutoff: NaiveDate) -> Option<Self> {
        let last_date_found = result.last_date_found().filter(|d| *d <= cutoff)?;
        Some(Self {
            url: url.to_string(),
            published_date: result.published_date(),
            modified_date: result.modified_date(),
            last_date_found,
        })
    }
}

/// Flatten every batch into one record list, in file order.
pub fn parse_corpus(json: &str) -> Result<Vec<ContentRecord>, serde_json::Error> {
    let batches: Vec<CorpusBatch> = serde_json::from_str(json)?;
    Ok(batches.into_iter().flat_map(|b| b.content_results).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagedate_core::{ExtractionMethod, FieldDate};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_corpus_flattens_batches() {
        let json = r#"[
            {"content_results": [
                {"url": "https://a.example", "text": "<p>a</p>", "success": true},
                {"url": "https://b.example", "text": null, "success": false}
            ]},
            {"content_results": [{"url": "https://c.example", "text": "<p>c</p>", "success": true}]}
        ]"#;

        let records = parse_corpus(json).unwrap();
        let urls: Vec<_> = records.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.example", "https://b.example", "https://c.example"]);
        assert_eq!(records[0].html(), Some("<p>a</p>"));
        assert_eq!(records[1].html(), None);
    }

    #[test]
    fn test_failed_fetch_has_no_html() {
        let record = ContentRecord { url: "u".into(), text: Some("<p>x</p>".into()), success: false };
        assert_eq!(record.html(), None);
    }

    #[test]
    fn test_keep_on_or_before_cutoff() {
        let published = FieldDate::found(ymd(2025, 9, 1), ExtractionMethod::OpenGraph, "2025-09-01");
        let result = DateResult::new(published, FieldDate::not_found(), vec![ymd(2024, 1, 1)]);

        let kept = CutoffRecord::keep("https://a.example", &result, ymd(2025, 10, 1)).unwrap();
        assert_eq!(kept.last_date_found, ymd(2025, 9, 1));
        assert_eq!(kept.published_date, Some(ymd(2025, 9, 1)));
        assert_eq!(kept.modified_date, None);

        assert_eq!(CutoffRecord::keep("https://a.example", &result, ymd(2025, 8, 31)), None);
        assert!(CutoffRecord::keep("https://a.example", &result, ymd(2025, 9, 1)).is_some());
    }

    #[test]
    fn test_undated_pages_are_dropped() {
        assert_eq!(CutoffRecord::keep("u", &DateResult::not_found(), ymd(2099, 1, 1)), None);
    }

    #[test]
    fn test_record_serialization() {
        let record = CutoffRecord {
            url: "https://a.example".into(),
            published_date: Some(ymd(2020, 1, 2)),
            modified_date: None,
            last_date_found: ymd(2020, 1, 2),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["published_date"], "2020-01-02");
        assert!(json["modified_date"].is_null());
        assert_eq!(json["last_date_found"], "2020-01-02");
    }
}
