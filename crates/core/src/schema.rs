//! Shapes of the structured endpoint's list and detail responses.
//!
//! Validation is deserialization: a payload is accepted when it decodes into
//! these types. Unknown keys are ignored, required keys must be present, and
//! `published_at` must be present even though its value may be `null`.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::{MigrateError, Result};

/// Discriminator carried by every post; only articles are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum PostType {
    Article,
}

/// Article category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleType {
    #[default]
    Tech,
    Idea,
}

impl ArticleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleType::Tech => "tech",
            ArticleType::Idea => "idea",
        }
    }

    /// Lenient parse used for scraped data; anything unrecognised is `Tech`.
    pub fn from_lenient(s: &str) -> Self {
        match s {
            "idea" => ArticleType::Idea,
            _ => ArticleType::Tech,
        }
    }
}

impl std::fmt::Display for ArticleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A topic as delivered upstream: either a bare name or an object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Topic {
    Name(String),
    Object(TopicObject),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TopicObject {
    pub name: String,
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub taggings_count: Option<Number>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Topic {
    pub fn name(&self) -> &str {
        match self {
            Topic::Name(name) => name,
            Topic::Object(topic) => &topic.name,
        }
    }
}

/// Flattens mixed topic entries to their names, preserving order.
pub fn topic_names(topics: &[Topic]) -> Vec<String> {
    topics.iter().map(|t| t.name().to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ArticleUser {
    pub id: u64,
    pub username: String,
    pub name: String,
    pub avatar_small_url: String,
}

fn zero() -> Number {
    Number::from(0)
}

/// Metadata record shared by list entries and detail responses.
///
/// Counts are kept as JSON numbers so both integer and float encodings pass.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ArticleMetadata {
    pub id: u64,
    pub post_type: PostType,
    pub title: String,
    pub slug: String,
    pub comments_count: Number,
    pub liked_count: Number,
    #[serde(default)]
    pub bookmarked_count: Option<Number>,
    #[serde(default = "zero")]
    pub body_letters_count: Number,
    pub article_type: ArticleType,
    pub emoji: String,
    pub is_suspending_private: bool,
    #[serde(deserialize_with = "Option::deserialize")]
    pub published_at: Option<String>,
    #[serde(default)]
    pub body_updated_at: Option<String>,
    #[serde(default)]
    pub source_repo_updated_at: Option<String>,
    #[serde(default)]
    pub pinned: Option<bool>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub user: Option<ArticleUser>,
    #[serde(default)]
    pub publication: Option<Value>,
    #[serde(default)]
    pub topics: Option<Vec<Topic>>,
}

impl ArticleMetadata {
    /// Normalised topic names; absent topics become an empty list.
    pub fn topic_names(&self) -> Vec<String> {
        self.topics.as_deref().map(topic_names).unwrap_or_default()
    }

    pub fn is_published(&self) -> bool {
        self.published_at.is_some()
    }
}

/// `GET /api/articles` response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ArticleListResponse {
    pub articles: Vec<ArticleMetadata>,
    #[serde(default)]
    pub next_page: Option<u64>,
}

impl ArticleListResponse {
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|source| MigrateError::Validation { schema: "article list", source })
    }

    pub fn slugs(&self) -> Vec<String> {
        self.articles.iter().map(|a| a.slug.clone()).collect()
    }
}

/// Metadata plus the optional body fields of a single article.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ArticleDetail {
    #[serde(flatten)]
    pub metadata: ArticleMetadata,
    #[serde(default)]
    pub body_markdown: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub body_html: Option<String>,
    #[serde(default)]
    pub body_html_preview: Option<String>,
    #[serde(default)]
    pub body_html_raw: Option<String>,
}

/// Body source selected from the optional body fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Body<'a> {
    Markdown(&'a str),
    Html(&'a str),
    Plain(&'a str),
}

impl ArticleDetail {
    /// Picks the body by priority: markdown, rendered HTML, then generic body.
    /// Empty strings count as absent.
    pub fn body(&self) -> Option<Body<'_>> {
        fn present(field: &Option<String>) -> Option<&str> {
            field.as_deref().filter(|s| !s.is_empty())
        }

        present(&self.body_markdown)
            .map(Body::Markdown)
            .or_else(|| present(&self.body_html).map(Body::Html))
            .or_else(|| present(&self.body).map(Body::Plain))
    }

    /// Names of the fields that carried a value, for diagnostics.
    pub fn available_fields(&self) -> Vec<&'static str> {
        let mut fields = vec!["id", "post_type", "title", "slug", "article_type", "emoji", "published_at"];
        let optional = [
            ("topics", self.metadata.topics.is_some()),
            ("user", self.metadata.user.is_some()),
            ("body_markdown", self.body_markdown.is_some()),
            ("body", self.body.is_some()),
            ("body_html", self.body_html.is_some()),
            ("body_html_preview", self.body_html_preview.is_some()),
            ("body_html_raw", self.body_html_raw.is_some()),
        ];
        fields.extend(optional.iter().filter(|(_, set)| *set).map(|(name, _)| *name));
        fields
    }
}

/// Accepted shapes of a detail response, in preference order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailShape {
    /// `{"article": {...}}`
    Wrapped,
    /// The detail object at the top level.
    Bare,
}

impl DetailShape {
    pub const PREFERENCE: [DetailShape; 2] = [DetailShape::Wrapped, DetailShape::Bare];

    pub fn schema_name(&self) -> &'static str {
        match self {
            DetailShape::Wrapped => "wrapped article detail",
            DetailShape::Bare => "article detail",
        }
    }

    fn validate(&self, value: &Value) -> std::result::Result<ArticleDetail, serde_json::Error> {
        #[derive(Deserialize)]
        struct Wrapped {
            article: ArticleDetail,
        }

        match self {
            DetailShape::Wrapped => Wrapped::deserialize(value).map(|w| w.article),
            DetailShape::Bare => ArticleDetail::deserialize(value),
        }
    }
}

/// Validates a detail payload against each [`DetailShape`] in preference order.
///
/// On success returns the detail and the shape that matched. On failure the
/// error of the last attempted shape is returned.
pub fn validate_detail(value: &Value) -> Result<(ArticleDetail, DetailShape)> {
    let mut last = None;

    for shape in DetailShape::PREFERENCE {
        match shape.validate(value) {
            Ok(detail) => return Ok((detail, shape)),
            Err(source) => {
                tracing::debug!(schema = shape.schema_name(), error = %source, "detail validation failed");
                last = Some(MigrateError::Validation { schema: shape.schema_name(), source });
            }
        }
    }

    Err(last.unwrap_or_else(|| unreachable!("DetailShape::PREFERENCE is non-empty")))
}

/// Top-level keys of an object payload (and of its `article` member), for logging.
pub fn describe_keys(value: &Value) -> (Vec<String>, Option<Vec<String>>) {
    let keys = |v: &Value| v.as_object().map(|o| o.keys().cloned().collect::<Vec<_>>());
    let top = keys(value).unwrap_or_default();
    let article = value.get("article").and_then(keys);
    (top, article)
}
