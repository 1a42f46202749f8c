//! All-dates sweep over the whole document.
//!
//! Independent of the waterfall: the full document text plus every meta
//! `content`/`value` attribute is scanned with a fixed set of date-shaped
//! patterns, each match is normalized, and the distinct calendar dates are
//! returned in ascending order. No provenance is attached.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use super::document::Document;
use super::normalize::normalize;

static DATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // ISO 8601 date-time
        r"(?i)\b\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}",
        // YYYY-MM-DD
        r"\b\d{4}-\d{2}-\d{2}",
        // Month D, YYYY
        r"(?i)\b(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]*\.?\s+\d{1,2},?\s+\d{4}",
        // D Month YYYY
        r"(?i)\b\d{1,2}\s+(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]*\.?\s+\d{4}",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid date pattern"))
    .collect()
});

/// Text searched by the sweep: document text, then meta attribute values.
fn corpus(doc: &Document<'_>) -> String {
    let mut parts = vec![doc.full_text()];
    for meta in doc.metas() {
        let attrs = meta.value();
        parts.extend(attrs.attr("content").map(str::to_string));
        parts.extend(attrs.attr("value").map(str::to_string));
    }
    parts.join("\n")
}

/// Date-shaped substrings found anywhere in the document.
pub fn candidates(doc: &Document<'_>) -> BTreeSet<String> {
    let source = corpus(doc);
    DATE_PATTERNS
        .iter()
        .flat_map(|re| re.find_iter(&source).map(|m| m.as_str().to_string()))
        .collect()
}

/// Distinct dates in the document, ascending.
pub fn aggregate(doc: &Document<'_>) -> Vec<NaiveDate> {
    let candidates = candidates(doc);
    tracing::debug!(count = candidates.len(), "date candidates");

    let dates: BTreeSet<NaiveDate> = candidates.iter().filter_map(|c| normalize(c).ok()).collect();
    dates.into_iter().collect()
}
