//! Sequencing list, fetch, and write over a whole account.
//!
//! [`Migrator`] is the entry point. It processes one slug at a time with a
//! fixed pause between articles and returns a [`MigrationSummary`].
//!
//! # Example
//!
//! ```rust,no_run
//! use zenn_migrate_core::{ClientConfig, MigrateConfig, Migrator};
//!
//! # async fn example() -> zenn_migrate_core::Result<()> {
//! let migrator = Migrator::from_config(ClientConfig::default(), MigrateConfig::default())?;
//! let summary = migrator.run("alice").await?;
//! println!("{}", summary);
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use tracing::{info, warn};
use url::Url;

use crate::extract::ArticleFetcher;
use crate::fetch::{ClientConfig, Endpoints, HttpClient, Transport};
use crate::formatters::MarkupConverter;
use crate::list::list_articles;
use crate::store::ArticleStore;
use crate::{Article, Result};

/// Output directory used when none is configured, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "articles";

/// Pause between articles used when none is configured.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(2);

/// Configuration for a migration run.
#[derive(Debug, Clone)]
pub struct MigrateConfig {
    /// Directory receiving `<slug>.md` and `<slug>_metadata.json` files.
    pub output_dir: PathBuf,
    /// Pause after every article, whatever its outcome.
    pub delay: Duration,
}

impl Default for MigrateConfig {
    fn default() -> Self {
        Self { output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR), delay: DEFAULT_DELAY }
    }
}

impl MigrateConfig {
    /// Creates a new builder for MigrateConfig.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use zenn_migrate_core::MigrateConfig;
    ///
    /// let config = MigrateConfig::builder().output_dir("out").delay(Duration::ZERO).build();
    /// assert_eq!(config.output_dir.to_str(), Some("out"));
    /// ```
    pub fn builder() -> MigrateConfigBuilder {
        MigrateConfigBuilder::new()
    }
}

/// Builder for MigrateConfig.
pub struct MigrateConfigBuilder {
    config: MigrateConfig,
}

impl MigrateConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: MigrateConfig::default() }
    }

    /// Sets the output directory.
    pub fn output_dir(mut self, value: impl Into<PathBuf>) -> Self {
        self.config.output_dir = value.into();
        self
    }

    /// Sets the pause between articles.
    pub fn delay(mut self, value: Duration) -> Self {
        self.config.delay = value;
        self
    }

    /// Builds the config.
    pub fn build(self) -> MigrateConfig {
        self.config
    }
}

impl Default for MigrateConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Success and failure tally of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationSummary {
    pub succeeded: usize,
    pub failed: usize,
    /// Slugs that produced no written article, in processing order.
    pub failed_slugs: Vec<String>,
}

impl MigrationSummary {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

impl fmt::Display for MigrationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Success: {}, Failed: {}", self.succeeded, self.failed)
    }
}

/// Drives a migration over a [`Transport`].
pub struct Migrator<T: Transport> {
    transport: T,
    endpoints: Endpoints,
    converter: MarkupConverter,
    store: ArticleStore,
    config: MigrateConfig,
}

impl Migrator<HttpClient> {
    /// Builds a migrator over a reqwest client.
    pub fn from_config(client: ClientConfig, config: MigrateConfig) -> Result<Self> {
        let base_url = client.base_url.clone();
        Self::new(HttpClient::new(client)?, &base_url, config)
    }
}

impl<T: Transport> Migrator<T> {
    pub fn new(transport: T, base_url: &Url, config: MigrateConfig) -> Result<Self> {
        Ok(Self {
            transport,
            endpoints: Endpoints::new(base_url)?,
            converter: MarkupConverter::new(),
            store: ArticleStore::new(config.output_dir.clone()),
            config,
        })
    }

    /// Replaces the markup converter, for example to register extra rewrite rules.
    pub fn with_converter(mut self, converter: MarkupConverter) -> Self {
        self.converter = converter;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn store(&self) -> &ArticleStore {
        &self.store
    }

    pub fn config(&self) -> &MigrateConfig {
        &self.config
    }

    /// Lists the account's article slugs.
    pub async fn list(&self, username: &str) -> Result<Vec<String>> {
        list_articles(&self.transport, &self.endpoints, username).await
    }

    /// Resolves one article without writing it.
    pub async fn fetch(&self, username: &str, slug: &str) -> Option<Article> {
        ArticleFetcher::new(&self.transport, &self.endpoints, &self.converter, &self.store)
            .fetch(username, slug)
            .await
    }

    /// Migrates every article of `username`.
    ///
    /// Listing failures and write failures abort the run; per-article fetch
    /// failures are counted.
    pub async fn run(&self, username: &str) -> Result<MigrationSummary> {
        self.store.ensure_dir()?;

        let slugs = self.list(username).await?;
        info!("Found {} articles", slugs.len());

        self.migrate_slugs(username, &slugs).await
    }

    /// Migrates the given slugs without listing the account.
    pub async fn migrate_slugs(&self, username: &str, slugs: &[String]) -> Result<MigrationSummary> {
        self.store.ensure_dir()?;

        let mut summary = MigrationSummary::default();

        for slug in slugs {
            match self.fetch(username, slug).await.filter(Article::has_content) {
                Some(article) => {
                    let path = self.store.save(&article)?;
                    info!("Saved: {}", path.display());
                    summary.succeeded += 1;
                }
                None => {
                    warn!("Failed to fetch: {}", slug);
                    summary.failed += 1;
                    summary.failed_slugs.push(slug.clone());
                }
            }

            if !self.config.delay.is_zero() {
                info!("Waiting {} seconds before next request...", self.config.delay.as_secs_f64());
                tokio::time::sleep(self.config.delay).await;
            }
        }

        info!("Migration completed. {}", summary);
        Ok(summary)
    }
}
