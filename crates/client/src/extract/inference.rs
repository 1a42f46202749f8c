//! Generic date inference used as the last waterfall step.
//!
//! [`DateInference`] is the seam for a broader, less precise date guesser.
//! [`HeuristicInference`] is the built-in engine:
//!
//! 1. For the original date, a date embedded in the canonical URL path
//!    (`/2021/04/12/` or `/2021-04-12`).
//! 2. Dates following labels in the document text: `Published`, `Posted`,
//!    `Written` for the original date; `Updated`, `Modified`, `Last modified`
//!    for the updated one. The earliest labelled date wins for original, the
//!    latest for updated.
//!
//! Results are returned as `YYYY-MM-DD` strings.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use super::document::Document;
use super::normalize::normalize;

/// A generic date guesser consulted after every structural strategy failed.
pub trait DateInference: Send + Sync {
    /// Best guess for the original (`original == true`) or updated date.
    fn infer(&self, doc: &Document<'_>, original: bool) -> Option<String>;
}

static URL_PATH_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/((?:19|20)\d{2})[/-](\d{1,2})[/-](\d{1,2})(?:[/-]|\.html?|$)").expect("valid url date regex")
});

static ORIGINAL_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:published|posted|written)(?:\s+on)?\s*:?\s*([^\n]{1,40})").expect("valid original label regex")
});

static UPDATED_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:last[\s-]+updated|last[\s-]+modified|updated|modified)(?:\s+on)?\s*:?\s*([^\n]{1,40})")
        .expect("valid updated label regex")
});

/// URL-path and label heuristics.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicInference;

impl HeuristicInference {
    pub fn new() -> Self {
        Self
    }

    fn url_date(doc: &Document<'_>) -> Option<NaiveDate> {
        let canonical = doc
            .select(r#"link[rel="canonical"]"#)
            .into_iter()
            .filter_map(|el| el.value().attr("href").map(str::to_string));
        let og_url = doc
            .metas()
            .into_iter()
            .filter(|m| m.value().attr("property") == Some("og:url"))
            .filter_map(|m| m.value().attr("content").map(str::to_string));

        canonical.chain(og_url).find_map(|url| {
            let caps = URL_PATH_DATE.captures(&url)?;
            NaiveDate::from_ymd_opt(caps[1].parse().ok()?, caps[2].parse().ok()?, caps[3].parse().ok()?)
        })
    }

    fn labelled_dates(text: &str, label: &Regex) -> Vec<NaiveDate> {
        label
            .captures_iter(text)
            .filter_map(|caps| normalize(&caps[1]).ok())
            .collect()
    }
}

impl DateInference for HeuristicInference {
    fn infer(&self, doc: &Document<'_>, original: bool) -> Option<String> {
        if original && let Some(date) = Self::url_date(doc) {
            return Some(date.format("%Y-%m-%d").to_string());
        }

        let text = doc.full_text();
        let date = if original {
            Self::labelled_dates(&text, &ORIGINAL_LABEL).into_iter().min()
        } else {
            Self::labelled_dates(&text, &UPDATED_LABEL).into_iter().max()
        }?;

        Some(date.format("%Y-%m-%d").to_string())
    }
}
