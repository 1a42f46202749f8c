//! Date extraction strategies.
//!
//! Each strategy inspects the parsed document for one kind of signal and
//! returns the first candidate that normalizes to a date. The lookup keys
//! differ per [`Field`]; the strategies themselves do not.

use std::sync::Arc;

use chrono::NaiveDate;
use pagedate_core::ExtractionMethod;
use serde_json::Value;

use super::document::{Document, element_text};
use super::inference::DateInference;
use super::normalize::normalize;

/// Which date a waterfall run is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Published,
    Modified,
}

/// Field-specific lookup keys.
#[derive(Debug)]
pub struct FieldKeys {
    /// Property name inside structured-data objects.
    pub json_ld_key: &'static str,
    /// Meta names in priority order.
    pub meta_names: &'static [&'static str],
    /// Selectors targeting `<time>`-like elements.
    pub time_selectors: &'static [&'static str],
    /// Broader class and attribute substring selectors.
    pub css_selectors: &'static [&'static str],
}

static PUBLISHED_KEYS: FieldKeys = FieldKeys {
    json_ld_key: "datePublished",
    meta_names: &[
        "article:published_time",
        "datePublished",
        "publishdate",
        "DC.date.issued",
        "date",
        "publication_date",
        "article.published",
        "sailthru.date",
        "article.created",
        "date.created",
        "pubdate",
        "og:article:published_time",
        "og:published_time",
    ],
    time_selectors: &["time[datetime]", "time[pubdate]", r#"[itemprop="datePublished"]"#, r#"[itemprop="dateCreated"]"#],
    css_selectors: &[
        ".published",
        ".date",
        ".post-date",
        ".article-date",
        ".entry-date",
        r#"[class*="publish"]"#,
        r#"[class*="date"]"#,
    ],
};

static MODIFIED_KEYS: FieldKeys = FieldKeys {
    json_ld_key: "dateModified",
    meta_names: &[
        "article:modified_time",
        "dateModified",
        "last-modified",
        "lastmod",
        "updated_time",
        "article.updated",
        "date.updated",
        "og:updated_time",
        "og:article:modified_time",
    ],
    time_selectors: &[r#"[itemprop="dateModified"]"#, "time.updated", "time.modified"],
    css_selectors: &[
        ".updated",
        ".modified",
        ".last-modified",
        r#"[class*="update"]"#,
        r#"[class*="modified"]"#,
    ],
};

impl Field {
    pub fn keys(&self) -> &'static FieldKeys {
        match self {
            Field::Published => &PUBLISHED_KEYS,
            Field::Modified => &MODIFIED_KEYS,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Published => "published",
            Field::Modified => "modified",
        }
    }
}

/// A normalized date plus the string it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Found {
    pub date: NaiveDate,
    pub raw: String,
}

/// One self-contained extraction technique.
pub trait Strategy: Send + Sync {
    /// Provenance tag attached to dates this strategy finds.
    fn method(&self) -> ExtractionMethod;

    /// First normalizable candidate for `field`, if any.
    fn try_extract(&self, doc: &Document<'_>, field: Field) -> Option<Found>;
}

/// First candidate that normalizes, in iteration order.
fn first_normalized<I>(candidates: I) -> Option<Found>
where
    I: IntoIterator<Item = String>,
{
    candidates.into_iter().find_map(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        normalize(trimmed).ok().map(|date| Found { date, raw: trimmed.to_string() })
    })
}

/// Schema.org `application/ld+json` blocks.
pub struct JsonLdStrategy;

impl JsonLdStrategy {
    fn strip_cdata(text: &str) -> &str {
        let mut s = text.trim();
        for prefix in ["//<![CDATA[", "<![CDATA["] {
            if let Some(rest) = s.strip_prefix(prefix) {
                s = rest;
            }
        }
        for suffix in ["//]]>", "]]>"] {
            if let Some(rest) = s.strip_suffix(suffix) {
                s = rest;
            }
        }
        s.trim()
    }

    /// Top-level objects (single or array), then members of any `@graph`.
    fn objects(value: &Value) -> Vec<&Value> {
        let top: Vec<&Value> = match value {
            Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };

        let mut objects = top.clone();
        for obj in top.iter().copied() {
            if let Some(graph) = obj.get("@graph").and_then(Value::as_array) {
                objects.extend(graph.iter());
            }
        }
        objects
    }
}

impl Strategy for JsonLdStrategy {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::JsonLd
    }

    fn try_extract(&self, doc: &Document<'_>, field: Field) -> Option<Found> {
        let key = field.keys().json_ld_key;

        for script in doc.select(r#"script[type="application/ld+json"]"#) {
            let text = script.text().collect::<String>();
            let value: Value = match serde_json::from_str(Self::strip_cdata(&text)) {
                Ok(v) => v,
                Err(e) => {
                    tracing::debug!("skipping malformed JSON-LD block: {e}");
                    continue;
                }
            };

            let candidates = Self::objects(&value)
                .into_iter()
                .filter_map(|obj| obj.get(key).and_then(Value::as_str).map(str::to_string));

            if let Some(found) = first_normalized(candidates) {
                tracing::debug!(raw = %found.raw, "found date in JSON-LD");
                return Some(found);
            }
        }

        None
    }
}

/// `<meta property=...>` tags. The first name in list order wins.
pub struct OpenGraphStrategy;

impl Strategy for OpenGraphStrategy {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::OpenGraph
    }

    fn try_extract(&self, doc: &Document<'_>, field: Field) -> Option<Found> {
        let metas = doc.metas();
        let candidates = field.keys().meta_names.iter().filter_map(|name| {
            metas
                .iter()
                .filter(|m| m.value().attr("property") == Some(*name))
                .find_map(|m| m.value().attr("content"))
                .map(str::to_string)
        });

        let found = first_normalized(candidates)?;
        tracing::debug!(raw = %found.raw, "found date in OG property");
        Some(found)
    }
}

/// `<time>`-like elements; the `datetime` attribute beats rendered text.
pub struct TimeElementStrategy;

impl Strategy for TimeElementStrategy {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Html5Time
    }

    fn try_extract(&self, doc: &Document<'_>, field: Field) -> Option<Found> {
        let candidates = field.keys().time_selectors.iter().flat_map(|css| {
            doc.select(css).into_iter().map(|el| match el.value().attr("datetime") {
                Some(dt) if !dt.trim().is_empty() => dt.to_string(),
                _ => element_text(&el),
            })
        });

        let found = first_normalized(candidates)?;
        tracing::debug!(raw = %found.raw, "found date in time element");
        Some(found)
    }
}

/// `<meta name=...>`, falling back to `<meta itemprop=...>` per name.
pub struct MetaTagStrategy;

impl Strategy for MetaTagStrategy {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::MetaTags
    }

    fn try_extract(&self, doc: &Document<'_>, field: Field) -> Option<Found> {
        let metas = doc.metas();
        let candidates = field.keys().meta_names.iter().filter_map(|name| {
            let by_attr = |attr: &str| {
                metas
                    .iter()
                    .filter(|m| m.value().attr(attr) == Some(*name))
                    .find_map(|m| m.value().attr("content"))
            };
            by_attr("name").or_else(|| by_attr("itemprop")).map(str::to_string)
        });

        let found = first_normalized(candidates)?;
        tracing::debug!(raw = %found.raw, "found date in meta tag");
        Some(found)
    }
}

/// Class and attribute substring selectors.
///
/// Per element: `datetime`, then `content`, then rendered text.
pub struct SelectorStrategy;

impl Strategy for SelectorStrategy {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::CssSelectors
    }

    fn try_extract(&self, doc: &Document<'_>, field: Field) -> Option<Found> {
        let candidates = field.keys().css_selectors.iter().flat_map(|css| {
            doc.select(css).into_iter().map(|el| {
                let attrs = el.value();
                attrs
                    .attr("datetime")
                    .or_else(|| attrs.attr("content"))
                    .filter(|v| !v.trim().is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| element_text(&el))
            })
        });

        let found = first_normalized(candidates)?;
        tracing::debug!(raw = %found.raw, "found date via selector");
        Some(found)
    }
}

/// Delegates to a [`DateInference`] engine, passing whether the original
/// (published) or updated date is wanted.
pub struct InferenceStrategy {
    engine: Arc<dyn DateInference>,
}

impl InferenceStrategy {
    pub fn new(engine: Arc<dyn DateInference>) -> Self {
        Self { engine }
    }
}

impl Strategy for InferenceStrategy {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::ExternalLibrary
    }

    fn try_extract(&self, doc: &Document<'_>, field: Field) -> Option<Found> {
        let raw = self.engine.infer(doc, field == Field::Published)?;
        let found = first_normalized([raw])?;
        tracing::debug!(raw = %found.raw, "found date via inference");
        Some(found)
    }
}
