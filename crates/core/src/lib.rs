pub mod article;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod formatters;
pub mod list;
pub mod migrate;
pub mod parse;
pub mod schema;
pub mod store;
#[cfg(test)]
mod testing;

pub use article::{Article, DEFAULT_EMOJI, MetadataRecord};
pub use error::{MigrateError, Result};
pub use extract::{ArticleFetcher, Strategy};
pub use fetch::{ClientConfig, Endpoints, HttpClient, HttpResponse, Transport};
pub use formatters::{EmbeddedWidgetRule, HeaderAnchorRule, MarkupConverter, RewriteContext, RewriteRule};
pub use formatters::{convert_to_markdown, generate_frontmatter, render_document};
pub use list::list_articles;
pub use migrate::{MigrateConfig, MigrateConfigBuilder, MigrationSummary, Migrator};
pub use parse::Document;
pub use schema::{ArticleDetail, ArticleListResponse, ArticleMetadata, ArticleType, DetailShape, Topic};
pub use store::ArticleStore;
