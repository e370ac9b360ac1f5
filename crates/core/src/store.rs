//! Writing exported articles to the output directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::formatters::frontmatter::render_document;
use crate::{Article, MetadataRecord, Result};

/// Output directory holding `<slug>.md` files and `<slug>_metadata.json` side records.
#[derive(Debug, Clone)]
pub struct ArticleStore {
    dir: PathBuf,
}

impl ArticleStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the directory (and parents) when missing.
    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    pub fn article_path(&self, slug: &str) -> PathBuf {
        self.dir.join(format!("{}.md", slug))
    }

    pub fn metadata_path(&self, slug: &str) -> PathBuf {
        self.dir.join(format!("{}_metadata.json", slug))
    }

    /// Writes the article with its header block, replacing any existing file.
    pub fn save(&self, article: &Article) -> Result<PathBuf> {
        let path = self.article_path(&article.slug);
        fs::write(&path, render_document(article))?;
        Ok(path)
    }

    /// Writes the metadata-only record as pretty-printed JSON.
    pub fn save_metadata(&self, record: &MetadataRecord) -> Result<PathBuf> {
        let path = self.metadata_path(&record.slug);
        let json = serde_json::to_string_pretty(record).map_err(std::io::Error::from)?;
        fs::write(&path, json)?;
        Ok(path)
    }
}
