//! Extraction result types shared by the deterministic and LLM extractors.
//!
//! A [`DateResult`] records, per field (published and modified), the calendar
//! date that was found, the [`ExtractionMethod`] that supplied it, the raw
//! matched string, and a [`Confidence`] tier derived from the method.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

/// Evidence class reported by the language model for a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmSource {
    JsonLd,
    MetaTags,
    HtmlBody,
}

impl LlmSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmSource::JsonLd => "json-ld",
            LlmSource::MetaTags => "meta-tags",
            LlmSource::HtmlBody => "html-body",
        }
    }
}

impl FromStr for LlmSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json-ld" => Ok(LlmSource::JsonLd),
            "meta-tags" => Ok(LlmSource::MetaTags),
            "html-body" => Ok(LlmSource::HtmlBody),
            other => Err(format!("unknown extraction method: {other}")),
        }
    }
}

/// Which signal supplied a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractionMethod {
    /// Schema.org `application/ld+json` block.
    JsonLd,
    /// `<meta property=...>` Open Graph style tag.
    OpenGraph,
    /// `<time>`-like element found by selector.
    Html5Time,
    /// `<meta name=...>` or `<meta itemprop=...>`.
    MetaTags,
    /// Class or attribute substring selector.
    CssSelectors,
    /// Delegated date inference fallback.
    ExternalLibrary,
    /// Language model answer, with the evidence class it reported.
    Llm(Option<LlmSource>),
    NotFound,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::JsonLd => "json_ld",
            ExtractionMethod::OpenGraph => "open_graph",
            ExtractionMethod::Html5Time => "html5_time",
            ExtractionMethod::MetaTags => "meta_tags",
            ExtractionMethod::CssSelectors => "css_selectors",
            ExtractionMethod::ExternalLibrary => "external_date_library",
            ExtractionMethod::Llm(Some(LlmSource::JsonLd)) => "llm (json-ld)",
            ExtractionMethod::Llm(Some(LlmSource::MetaTags)) => "llm (meta-tags)",
            ExtractionMethod::Llm(Some(LlmSource::HtmlBody)) => "llm (html-body)",
            ExtractionMethod::Llm(None) => "llm (not found)",
            ExtractionMethod::NotFound => "not_found",
        }
    }

    pub fn is_found(&self) -> bool {
        !matches!(self, ExtractionMethod::NotFound)
    }

    /// Confidence tier for this method.
    pub fn confidence(&self) -> Confidence {
        Confidence::for_method(*self)
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ExtractionMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Coarse trust label for an extracted date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
    NotFound,
}

/// Method to confidence mapping. Every [`ExtractionMethod`] value has exactly one row.
pub const CONFIDENCE_TABLE: &[(ExtractionMethod, Confidence)] = &[
    (ExtractionMethod::JsonLd, Confidence::High),
    (ExtractionMethod::OpenGraph, Confidence::High),
    (ExtractionMethod::MetaTags, Confidence::Medium),
    (ExtractionMethod::ExternalLibrary, Confidence::Medium),
    (ExtractionMethod::Html5Time, Confidence::Low),
    (ExtractionMethod::CssSelectors, Confidence::Low),
    (ExtractionMethod::Llm(Some(LlmSource::JsonLd)), Confidence::High),
    (ExtractionMethod::Llm(Some(LlmSource::MetaTags)), Confidence::Medium),
    (ExtractionMethod::Llm(Some(LlmSource::HtmlBody)), Confidence::Low),
    (ExtractionMethod::Llm(None), Confidence::Low),
    (ExtractionMethod::NotFound, Confidence::NotFound),
];

impl Confidence {
    pub fn for_method(method: ExtractionMethod) -> Self {
        CONFIDENCE_TABLE
            .iter()
            .find(|(m, _)| *m == method)
            .map(|(_, c)| *c)
            .unwrap_or(Confidence::NotFound)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
            Confidence::NotFound => "not_found",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome for a single field (published or modified).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDate {
    pub date: Option<NaiveDate>,
    pub method: ExtractionMethod,
    pub raw: Option<String>,
}

impl FieldDate {
    pub fn found(date: NaiveDate, method: ExtractionMethod, raw: impl Into<String>) -> Self {
        Self { date: Some(date), method, raw: Some(raw.into()) }
    }

    pub fn not_found() -> Self {
        Self { date: None, method: ExtractionMethod::NotFound, raw: None }
    }
}

/// Extraction result for one HTML document.
///
/// Built once per call through [`DateResult::new`]; fields are read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateResult {
    published_date: Option<NaiveDate>,
    modified_date: Option<NaiveDate>,
    published_method: ExtractionMethod,
    modified_method: ExtractionMethod,
    published_raw: Option<String>,
    modified_raw: Option<String>,
    last_date_found: Option<NaiveDate>,
    dates_found: Vec<NaiveDate>,
    pub_confidence: Confidence,
    mod_confidence: Confidence,
}

impl DateResult {
    /// Assemble a result from two field outcomes and the aggregated dates.
    ///
    /// The field dates are merged into `dates_found`, which is sorted and
    /// deduplicated; `last_date_found` is its maximum. A `NotFound` method
    /// always drops the date, and confidence comes from the method table.
    pub fn new(published: FieldDate, modified: FieldDate, mut dates_found: Vec<NaiveDate>) -> Self {
        let published = Self::settle(published);
        let modified = Self::settle(modified);

        dates_found.extend(published.date);
        dates_found.extend(modified.date);
        dates_found.sort_unstable();
        dates_found.dedup();
        let last_date_found = dates_found.last().copied();

        Self {
            published_date: published.date,
            modified_date: modified.date,
            published_method: published.method,
            modified_method: modified.method,
            published_raw: published.raw,
            modified_raw: modified.raw,
            last_date_found,
            dates_found,
            pub_confidence: published.method.confidence(),
            mod_confidence: modified.method.confidence(),
        }
    }

    fn settle(field: FieldDate) -> FieldDate {
        match field.method {
            ExtractionMethod::NotFound => FieldDate::not_found(),
            _ => field,
        }
    }

    /// Nothing found for either field and no stray dates.
    pub fn not_found() -> Self {
        Self::new(FieldDate::not_found(), FieldDate::not_found(), Vec::new())
    }

    /// Result returned when every LLM attempt failed.
    pub fn llm_exhausted() -> Self {
        let field = FieldDate { date: None, method: ExtractionMethod::Llm(None), raw: None };
        Self::new(field.clone(), field, Vec::new())
    }

    pub fn published_date(&self) -> Option<NaiveDate> {
        self.published_date
    }

    pub fn modified_date(&self) -> Option<NaiveDate> {
        self.modified_date
    }

    pub fn published_method(&self) -> ExtractionMethod {
        self.published_method
    }

    pub fn modified_method(&self) -> ExtractionMethod {
        self.modified_method
    }

    pub fn published_raw(&self) -> Option<&str> {
        self.published_raw.as_deref()
    }

    pub fn modified_raw(&self) -> Option<&str> {
        self.modified_raw.as_deref()
    }

    pub fn last_date_found(&self) -> Option<NaiveDate> {
        self.last_date_found
    }

    pub fn dates_found(&self) -> &[NaiveDate] {
        &self.dates_found
    }

    pub fn pub_confidence(&self) -> Confidence {
        self.pub_confidence
    }

    pub fn mod_confidence(&self) -> Confidence {
        self.mod_confidence
    }

    /// Whether the latest date on the page is on or before `cutoff`.
    ///
    /// Pages with no dates at all are never included.
    pub fn is_on_or_before(&self, cutoff: NaiveDate) -> bool {
        self.last_date_found.is_some_and(|d| d <= cutoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_confidence_table_covers_every_method() {
        let methods = [
            ExtractionMethod::JsonLd,
            ExtractionMethod::OpenGraph,
            ExtractionMethod::Html5Time,
            ExtractionMethod::MetaTags,
            ExtractionMethod::CssSelectors,
            ExtractionMethod::ExternalLibrary,
            ExtractionMethod::Llm(Some(LlmSource::JsonLd)),
            ExtractionMethod::Llm(Some(LlmSource::MetaTags)),
            ExtractionMethod::Llm(Some(LlmSource::HtmlBody)),
            ExtractionMethod::Llm(None),
            ExtractionMethod::NotFound,
        ];
        for method in methods {
            let rows = CONFIDENCE_TABLE.iter().filter(|(m, _)| *m == method).count();
            assert_eq!(rows, 1, "{method} should have exactly one row");
        }
        assert_eq!(CONFIDENCE_TABLE.len(), methods.len());
    }

    #[test]
    fn test_confidence_tiers() {
        assert_eq!(ExtractionMethod::JsonLd.confidence(), Confidence::High);
        assert_eq!(ExtractionMethod::OpenGraph.confidence(), Confidence::High);
        assert_eq!(ExtractionMethod::MetaTags.confidence(), Confidence::Medium);
        assert_eq!(ExtractionMethod::ExternalLibrary.confidence(), Confidence::Medium);
        assert_eq!(ExtractionMethod::Html5Time.confidence(), Confidence::Low);
        assert_eq!(ExtractionMethod::CssSelectors.confidence(), Confidence::Low);
        assert_eq!(ExtractionMethod::NotFound.confidence(), Confidence::NotFound);
        assert_eq!(ExtractionMethod::Llm(None).confidence(), Confidence::Low);
        assert_eq!(ExtractionMethod::Llm(Some(LlmSource::JsonLd)).confidence(), Confidence::High);
    }

    #[test]
    fn test_llm_source_from_str() {
        assert_eq!("json-ld".parse::<LlmSource>(), Ok(LlmSource::JsonLd));
        assert_eq!("meta-tags".parse::<LlmSource>(), Ok(LlmSource::MetaTags));
        assert_eq!("html-body".parse::<LlmSource>(), Ok(LlmSource::HtmlBody));
        assert!("JSON-LD".parse::<LlmSource>().is_err());
        assert!("url".parse::<LlmSource>().is_err());
    }

    #[test]
    fn test_new_merges_and_sorts_dates() {
        let published = FieldDate::found(ymd(2020, 9, 16), ExtractionMethod::JsonLd, "2020-09-16T14:24:00Z");
        let modified = FieldDate::found(ymd(2025, 6, 3), ExtractionMethod::JsonLd, "2025-06-03T08:40:58Z");
        let result = DateResult::new(published, modified, vec![ymd(2021, 1, 1), ymd(2020, 9, 16)]);

        assert_eq!(result.dates_found(), &[ymd(2020, 9, 16), ymd(2021, 1, 1), ymd(2025, 6, 3)]);
        assert_eq!(result.last_date_found(), Some(ymd(2025, 6, 3)));
        assert_eq!(result.pub_confidence(), Confidence::High);
    }

    #[test]
    fn test_not_found_method_drops_date() {
        let bogus = FieldDate { date: Some(ymd(2020, 1, 1)), method: ExtractionMethod::NotFound, raw: Some("x".into()) };
        let result = DateResult::new(bogus, FieldDate::not_found(), Vec::new());
        assert_eq!(result.published_date(), None);
        assert_eq!(result.published_raw(), None);
        assert!(result.dates_found().is_empty());
        assert_eq!(result.last_date_found(), None);
    }

    #[test]
    fn test_not_found_result() {
        let result = DateResult::not_found();
        assert_eq!(result.published_method(), ExtractionMethod::NotFound);
        assert_eq!(result.modified_method(), ExtractionMethod::NotFound);
        assert_eq!(result.pub_confidence(), Confidence::NotFound);
        assert_eq!(result.mod_confidence(), Confidence::NotFound);
        assert!(result.dates_found().is_empty());
    }

    #[test]
    fn test_llm_exhausted_result() {
        let result = DateResult::llm_exhausted();
        assert_eq!(result.published_method().as_str(), "llm (not found)");
        assert_eq!(result.modified_method().as_str(), "llm (not found)");
        assert_eq!(result.pub_confidence(), Confidence::Low);
        assert_eq!(result.mod_confidence(), Confidence::Low);
        assert_eq!(result.published_date(), None);
        assert_eq!(result.last_date_found(), None);
    }

    #[test]
    fn test_dates_found_not_shared_between_results() {
        let a = DateResult::not_found();
        let b = DateResult::new(
            FieldDate::found(ymd(2024, 2, 2), ExtractionMethod::MetaTags, "2024-02-02"),
            FieldDate::not_found(),
            Vec::new(),
        );
        assert!(a.dates_found().is_empty());
        assert_eq!(b.dates_found().len(), 1);
    }

    #[test]
    fn test_is_on_or_before() {
        let result = DateResult::new(
            FieldDate::found(ymd(2025, 10, 1), ExtractionMethod::OpenGraph, "2025-10-01"),
            FieldDate::not_found(),
            Vec::new(),
        );
        assert!(result.is_on_or_before(ymd(2025, 10, 1)));
        assert!(!result.is_on_or_before(ymd(2025, 9, 30)));
        assert!(!DateResult::not_found().is_on_or_before(ymd(2030, 1, 1)));
    }

    #[test]
    fn test_serialize_json_shape() {
        let result = DateResult::new(
            FieldDate::found(ymd(2025, 11, 14), ExtractionMethod::OpenGraph, "2025-11-14T18:00:00Z"),
            FieldDate::not_found(),
            Vec::new(),
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["published_date"], "2025-11-14");
        assert_eq!(json["published_method"], "open_graph");
        assert_eq!(json["pub_confidence"], "high");
        assert_eq!(json["modified_date"], serde_json::Value::Null);
        assert_eq!(json["modified_method"], "not_found");
        assert_eq!(json["mod_confidence"], "not_found");
        assert_eq!(json["last_date_found"], "2025-11-14");
        assert_eq!(json["dates_found"], serde_json::json!(["2025-11-14"]));
    }
}
