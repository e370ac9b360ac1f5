//! Resolving one article's content and metadata.
//!
//! Resolution walks an ordered list of strategies until one reaches a
//! verdict:
//!
//! 1. [`Strategy::Api`]: the structured detail endpoint. Content comes from
//!    `body_markdown`, converted `body_html`, or `body`, in that order. When
//!    none is present a metadata-only record is written and the verdict is
//!    "no article".
//! 2. [`Strategy::RenderedPage`]: the rendered article page, read first for
//!    its embedded `__NEXT_DATA__` payload and then by a best-effort scrape.
//!
//! A strategy that fails or declines hands over to the next one. Nothing
//! escapes [`ArticleFetcher::fetch`]: when every strategy is exhausted the
//! result is `None`.

use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::article::DEFAULT_EMOJI;
use crate::fetch::{Endpoints, Transport};
use crate::formatters::MarkupConverter;
use crate::parse::Document;
use crate::schema::{Body, DetailShape, describe_keys, validate_detail};
use crate::store::ArticleStore;
use crate::{Article, ArticleType, MetadataRecord, MigrateError, Result};

/// Where an article can be resolved from, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Api,
    RenderedPage,
}

impl Strategy {
    pub const ORDER: [Strategy; 2] = [Strategy::Api, Strategy::RenderedPage];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Api => "API",
            Strategy::RenderedPage => "HTML",
        }
    }
}

/// Verdict of a single strategy.
#[derive(Debug)]
enum Step {
    /// Stop here with this result.
    Done(Option<Article>),
    /// Let the next strategy try.
    Fallthrough,
}

/// Extracts an article from a parsed page, or declines.
type PageScraper = fn(&MarkupConverter, &Document, &str) -> Option<Article>;

const PAGE_SCRAPERS: [(&str, PageScraper); 2] =
    [("embedded data", article_from_next_data), ("heading scrape", article_from_heading)];

const MANUAL_EXTRACTION_NOTE: &str = "[Content needs manual extraction from Zenn]";

/// Fetches single articles through the strategy chain.
pub struct ArticleFetcher<'a, T: Transport> {
    transport: &'a T,
    endpoints: &'a Endpoints,
    converter: &'a MarkupConverter,
    store: &'a ArticleStore,
}

impl<'a, T: Transport> ArticleFetcher<'a, T> {
    pub fn new(
        transport: &'a T, endpoints: &'a Endpoints, converter: &'a MarkupConverter, store: &'a ArticleStore,
    ) -> Self {
        Self { transport, endpoints, converter, store }
    }

    /// Resolves `slug`, returning `None` when no strategy produced an article.
    pub async fn fetch(&self, username: &str, slug: &str) -> Option<Article> {
        info!("Fetching article: {}...", slug);

        for strategy in Strategy::ORDER {
            match self.resolve(strategy, username, slug).await {
                Ok(Step::Done(article)) => return article,
                Ok(Step::Fallthrough) => {}
                Err(e) if e.is_validation() => {
                    warn!(strategy = strategy.name(), error = %e, "Response validation failed")
                }
                Err(e) => warn!(strategy = strategy.name(), error = %e, "Fetch error"),
            }

            if strategy == Strategy::Api {
                info!("Trying HTML fallback...");
            }
        }

        None
    }

    async fn resolve(&self, strategy: Strategy, username: &str, slug: &str) -> Result<Step> {
        match strategy {
            Strategy::Api => self.from_api(slug).await,
            Strategy::RenderedPage => self.from_page(username, slug).await,
        }
    }

    async fn from_api(&self, slug: &str) -> Result<Step> {
        let url = self.endpoints.article_detail(slug)?;
        info!("Trying API: {}", url);

        let response = self.transport.get(&url).await?;
        info!("API Response Status: {}", response.status);

        if !response.is_success() {
            debug!("API Error Response: {}...", response.excerpt(200));
            match response.status {
                StatusCode::NOT_FOUND => info!("Article not found via API"),
                StatusCode::FORBIDDEN => warn!("Access forbidden - API might be protected"),
                StatusCode::TOO_MANY_REQUESTS => warn!("Rate limited - too many requests"),
                _ => {}
            }
            return Ok(Step::Fallthrough);
        }

        let value: Value = serde_json::from_str(&response.body).map_err(MigrateError::DecodeError)?;
        let (detail, shape) = validate_detail(&value).inspect_err(|_| {
            let (top, article) = describe_keys(&value);
            warn!("Both schema validations failed");
            debug!("Response structure: {:?}", top);
            if let Some(fields) = article {
                debug!("Article fields: {:?}", fields);
            }
        })?;

        if shape == DetailShape::Bare {
            info!("Validated with the bare article schema");
        }
        info!("API Success: Retrieved article \"{}\"", detail.metadata.title);

        let content = match detail.body() {
            Some(Body::Markdown(markdown)) => {
                info!("Found body_markdown - using as-is");
                markdown.to_string()
            }
            Some(Body::Html(html)) => {
                info!("Found body_html - converting to Markdown");
                self.converter.convert(html)?
            }
            Some(Body::Plain(body)) => {
                info!("Found body field");
                body.to_string()
            }
            None => {
                warn!("No body content found. Saving metadata only");
                info!(
                    "Article has {} characters but content not accessible",
                    detail.metadata.body_letters_count
                );
                debug!("Available fields: {}", detail.available_fields().join(", "));

                let path = self.store.save_metadata(&MetadataRecord::from(&detail.metadata))?;
                info!("Saved metadata to {}", path.display());
                return Ok(Step::Done(None));
            }
        };

        Ok(Step::Done(Some(Article::from_metadata(&detail.metadata, content))))
    }

    async fn from_page(&self, username: &str, slug: &str) -> Result<Step> {
        let url = self.endpoints.article_page(username, slug)?;
        info!("Fetching HTML: {}", url);

        let response = self.transport.get(&url).await?;
        info!("HTML Response Status: {}", response.status);
        let response = response.error_for_status(&url)?;

        let doc = Document::parse(&response.body)?;
        for (name, scrape) in PAGE_SCRAPERS {
            if let Some(article) = scrape(self.converter, &doc, slug) {
                debug!(source = name, "Resolved article from rendered page");
                return Ok(Step::Done(Some(article)));
            }
        }

        Ok(Step::Done(None))
    }
}

/// Maps `props.pageProps.article` of the embedded data block onto an [`Article`].
fn article_from_next_data(converter: &MarkupConverter, doc: &Document, slug: &str) -> Option<Article> {
    let data = match doc.next_data()? {
        Ok(data) => data,
        Err(e) => {
            warn!(error = %e, "Failed to parse JSON data");
            return None;
        }
    };

    let article = data.pointer("/props/pageProps/article").filter(|a| a.is_object())?;
    Some(article_from_embedded(converter, article, slug))
}

/// Builds an article from an embedded payload with permissive defaults.
pub fn article_from_embedded(converter: &MarkupConverter, article: &Value, slug: &str) -> Article {
    let text = |key: &str| article.get(key).and_then(Value::as_str).filter(|s| !s.is_empty());

    let topics = article
        .get("topics")
        .and_then(Value::as_array)
        .map(|topics| {
            topics
                .iter()
                .filter_map(|t| t.get("name").and_then(Value::as_str).or_else(|| t.as_str()))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let content = if let Some(markdown) = text("body_markdown") {
        markdown.to_string()
    } else if let Some(html) = text("body_html") {
        converter.convert(html).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to convert embedded body_html");
            String::new()
        })
    } else {
        text("body").unwrap_or_default().to_string()
    };

    Article {
        slug: text("slug").unwrap_or(slug).to_string(),
        title: text("title").unwrap_or_default().to_string(),
        emoji: text("emoji").unwrap_or(DEFAULT_EMOJI).to_string(),
        article_type: text("article_type").map(ArticleType::from_lenient).unwrap_or_default(),
        topics,
        published: article.get("published").and_then(Value::as_bool).unwrap_or(false),
        content,
    }
}

/// Last resort: a title from the first `<h1>` and a placeholder body.
///
/// The placeholder is only produced when the rendered body container exists;
/// publication state is unknown here and is reported as unpublished.
fn article_from_heading(_converter: &MarkupConverter, doc: &Document, slug: &str) -> Option<Article> {
    let title = doc.first_heading().unwrap_or_default();
    let content = if doc.has_article_body() {
        format!("# {}\n\n{}", title, MANUAL_EXTRACTION_NOTE)
    } else {
        String::new()
    };

    if content.is_empty() {
        warn!("No article body found on the rendered page");
    } else {
        info!("Scraped title only; body needs manual extraction");
    }

    Some(Article {
        slug: slug.to_string(),
        title,
        emoji: DEFAULT_EMOJI.to_string(),
        article_type: ArticleType::Tech,
        topics: Vec::new(),
        published: false,
        content,
    })
}
