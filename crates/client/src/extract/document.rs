//! Parsed HTML document shared by the strategies and the aggregator.

use pagedate_core::Error;
use scraper::{ElementRef, Html, Node, Selector};

/// Elements that start a new line of text.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption", "footer", "h1", "h2",
    "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table", "td", "th",
    "tr", "ul",
];

/// An HTML document parsed once and queried by every strategy.
pub struct Document<'a> {
    tree: Html,
    raw: &'a str,
}

impl<'a> Document<'a> {
    /// Parse raw HTML into a navigable tree.
    ///
    /// The HTML5 tree builder recovers from malformed markup, so the only
    /// failure is input with no content at all.
    pub fn parse(raw: &'a str) -> Result<Self, Error> {
        if raw.trim().is_empty() {
            return Err(Error::ParseFailed("document is empty".into()));
        }

        Ok(Self { tree: Html::parse_document(raw), raw })
    }

    pub fn tree(&self) -> &Html {
        &self.tree
    }

    pub fn raw(&self) -> &'a str {
        self.raw
    }

    /// Elements matching `css`, in document order. An invalid selector matches nothing.
    pub fn select(&self, css: &str) -> Vec<ElementRef<'_>> {
        match Selector::parse(css) {
            Ok(selector) => self.tree.select(&selector).collect(),
            Err(e) => {
                tracing::debug!(selector = css, "skipping invalid selector: {e}");
                Vec::new()
            }
        }
    }

    /// All `<meta>` elements in document order.
    pub fn metas(&self) -> Vec<ElementRef<'_>> {
        self.select("meta")
    }

    /// Document text. Inline runs are concatenated as written, so
    /// `<b>March 3</b>, 2019` reads `March 3, 2019`; block elements start a
    /// new line.
    pub fn full_text(&self) -> String {
        let mut out = String::new();
        for node in self.tree.root_element().descendants() {
            match node.value() {
                Node::Text(text) => out.push_str(text),
                Node::Element(el) if BLOCK_ELEMENTS.contains(&el.name()) && !out.is_empty() => out.push('\n'),
                _ => {}
            }
        }
        out
    }
}

/// Rendered text of an element with whitespace collapsed.
pub fn element_text(element: &ElementRef<'_>) -> String {
    element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}
