//! The exported article and its metadata-only side record.
//!
//! An [`Article`] is built once per successful fetch, written, and dropped.
//! Topic entries are already plain names by the time an `Article` exists.

use serde::Serialize;
use serde_json::Number;

use crate::schema::{ArticleMetadata, ArticleType};

/// Emoji used when scraped data carries none.
pub const DEFAULT_EMOJI: &str = "📝";

/// One article ready to be written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    /// Stable identifier, used as the file stem.
    pub slug: String,
    pub title: String,
    pub emoji: String,
    #[serde(rename = "type")]
    pub article_type: ArticleType,
    /// Topic names in source order.
    pub topics: Vec<String>,
    pub published: bool,
    /// Markdown body.
    pub content: String,
}

impl Article {
    /// Builds an article from validated metadata and an already resolved body.
    pub fn from_metadata(metadata: &ArticleMetadata, content: String) -> Self {
        Self {
            slug: metadata.slug.clone(),
            title: metadata.title.clone(),
            emoji: metadata.emoji.clone(),
            article_type: metadata.article_type,
            topics: metadata.topic_names(),
            published: metadata.is_published(),
            content,
        }
    }

    /// An article only counts as migrated when it has a body.
    pub fn has_content(&self) -> bool {
        !self.content.is_empty()
    }
}

/// What gets kept for an article whose body could not be retrieved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataRecord {
    pub slug: String,
    pub title: String,
    pub emoji: String,
    #[serde(rename = "type")]
    pub article_type: ArticleType,
    pub topics: Vec<String>,
    pub published_at: Option<String>,
    pub liked_count: Number,
    pub comments_count: Number,
    pub body_letters_count: Number,
}

impl From<&ArticleMetadata> for MetadataRecord {
    fn from(metadata: &ArticleMetadata) -> Self {
        Self {
            slug: metadata.slug.clone(),
            title: metadata.title.clone(),
            emoji: metadata.emoji.clone(),
            article_type: metadata.article_type,
            topics: metadata.topic_names(),
            published_at: metadata.published_at.clone(),
            liked_count: metadata.liked_count.clone(),
            comments_count: metadata.comments_count.clone(),
            body_letters_count: metadata.body_letters_count.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metadata() -> ArticleMetadata {
        serde_json::from_value(json!({
            "id": 7,
            "post_type": "Article",
            "title": "Notes",
            "slug": "abc123",
            "comments_count": 2,
            "liked_count": 10,
            "body_letters_count": 4200,
            "article_type": "idea",
            "emoji": "💡",
            "is_suspending_private": false,
            "published_at": null,
            "topics": [{"name": "rust"}, "zenn"]
        }))
        .unwrap()
    }

    #[test]
    fn test_article_from_metadata() {
        let article = Article::from_metadata(&metadata(), "body".to_string());
        assert_eq!(article.slug, "abc123");
        assert_eq!(article.article_type, ArticleType::Idea);
        assert_eq!(article.topics, vec!["rust", "zenn"]);
        assert!(!article.published);
        assert!(article.has_content());
    }

    #[test]
    fn test_metadata_record_serializes_type_key() {
        let record = MetadataRecord::from(&metadata());
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "idea");
        assert_eq!(value["topics"], json!(["rust", "zenn"]));
        assert_eq!(value["published_at"], serde_json::Value::Null);
        assert_eq!(value["body_letters_count"], 4200);
    }
}
