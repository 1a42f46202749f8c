//! Fixed-priority strategy waterfall.
//!
//! Strategies run in list order for one field and the first that yields a
//! normalizable date wins. Later strategies are never consulted.

use std::sync::Arc;

use pagedate_core::{ExtractionMethod, FieldDate};

use super::document::Document;
use super::inference::DateInference;
use super::strategy::{
    Field, InferenceStrategy, JsonLdStrategy, MetaTagStrategy, OpenGraphStrategy, SelectorStrategy, Strategy,
    TimeElementStrategy,
};

/// An ordered list of strategies.
pub struct Waterfall {
    strategies: Vec<Box<dyn Strategy>>,
}

impl Waterfall {
    pub fn new(strategies: Vec<Box<dyn Strategy>>) -> Self {
        Self { strategies }
    }

    /// The standard order: JSON-LD, Open Graph, time elements, meta tags,
    /// generic selectors, then `inference` when one is given.
    pub fn standard(inference: Option<Arc<dyn DateInference>>) -> Self {
        let mut strategies: Vec<Box<dyn Strategy>> = vec![
            Box::new(JsonLdStrategy),
            Box::new(OpenGraphStrategy),
            Box::new(TimeElementStrategy),
            Box::new(MetaTagStrategy),
            Box::new(SelectorStrategy),
        ];
        if let Some(engine) = inference {
            strategies.push(Box::new(InferenceStrategy::new(engine)));
        }
        Self::new(strategies)
    }

    /// Methods in the order they are tried.
    pub fn order(&self) -> Vec<ExtractionMethod> {
        self.strategies.iter().map(|s| s.method()).collect()
    }

    pub fn run(&self, doc: &Document<'_>, field: Field) -> FieldDate {
        for strategy in &self.strategies {
            if let Some(found) = strategy.try_extract(doc, field) {
                tracing::debug!(field = field.as_str(), method = %strategy.method(), raw = %found.raw, "strategy hit");
                return FieldDate::found(found.date, strategy.method(), found.raw);
            }
        }
        FieldDate::not_found()
    }
}
