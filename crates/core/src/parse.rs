//! Rendered page parsing.
//!
//! This module provides the [`Document`] type, a thin wrapper over a parsed
//! `scraper` tree with the handful of queries the fallback paths need: the
//! article links on a profile page, the embedded `__NEXT_DATA__` block, and
//! the first `<h1>` of an article page.
//!
//! # Example
//!
//! ```rust
//! use zenn_migrate_core::parse::Document;
//!
//! let html = r#"<html><body><a href="/alice/articles/abc123">A</a></body></html>"#;
//! let doc = Document::parse(html).unwrap();
//! assert_eq!(doc.article_slugs(), vec!["abc123".to_string()]);
//! ```

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;

use crate::{MigrateError, Result};

static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
static FIRST_HEADING: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").unwrap());
static NEXT_DATA: LazyLock<Selector> = LazyLock::new(|| Selector::parse("script#__NEXT_DATA__").unwrap());
static ARTICLE_BODY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.znc").unwrap());

static ARTICLE_HREF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^/[^/]+/articles/([a-z0-9]+)$").unwrap());

/// A parsed rendered page.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses HTML from a string.
    ///
    /// Parsing is lenient: malformed markup still yields a document.
    pub fn parse(html: &str) -> Result<Self> {
        Ok(Self { html: Html::parse_document(html) })
    }

    /// Article slugs linked from this page, deduplicated in first-seen order.
    ///
    /// Only links of the form `/<user>/articles/<slug>` with a lowercase
    /// alphanumeric slug are considered.
    pub fn article_slugs(&self) -> Vec<String> {
        let mut seen = HashSet::new();

        self.html
            .select(&ANCHOR)
            .filter_map(|a| a.value().attr("href"))
            .filter_map(|href| ARTICLE_HREF.captures(href).map(|caps| caps[1].to_string()))
            .filter(|slug| seen.insert(slug.clone()))
            .collect()
    }

    /// Trimmed text of the first non-empty `<h1>`.
    pub fn first_heading(&self) -> Option<String> {
        self.html
            .select(&FIRST_HEADING)
            .map(|h| h.text().collect::<String>().trim().to_string())
            .find(|text| !text.is_empty())
    }

    /// The JSON payload of the `__NEXT_DATA__` script, if the page has one.
    pub fn next_data(&self) -> Option<Result<Value>> {
        let script = self.html.select(&NEXT_DATA).next()?;
        let raw = script.text().collect::<String>();
        Some(serde_json::from_str(&raw).map_err(MigrateError::DecodeError))
    }

    /// Whether the rendered article body container is present.
    pub fn has_article_body(&self) -> bool {
        self.html.select(&ARTICLE_BODY).next().is_some()
    }
}
