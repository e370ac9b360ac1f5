//! Error types for migration operations.
//!
//! This module defines the main error type [`MigrateError`] which represents
//! everything that can go wrong while listing, fetching, converting, and
//! writing articles.
//!
//! Most of these errors are recoverable inside the library: a transport or
//! validation failure on the structured endpoint sends the fetcher down its
//! rendered-page fallback. Only listing failures and write failures reach the
//! caller of [`Migrator::run`](crate::Migrator::run).
//!
//! # Example
//!
//! ```rust
//! use zenn_migrate_core::{MigrateError, Result};
//!
//! fn require_slug(slug: &str) -> Result<&str> {
//!     if slug.is_empty() {
//!         return Err(MigrateError::InvalidUrl("empty slug".to_string()));
//!     }
//!     Ok(slug)
//! }
//! # assert!(require_slug("").is_err());
//! ```

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for migration operations.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// HTTP request errors from reqwest.
    ///
    /// This variant wraps network errors, DNS failures, connection issues,
    /// and other HTTP-related problems.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request timeout.
    ///
    /// Returned when an HTTP request exceeds the configured timeout duration.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// The server answered with a non-2xx status.
    #[error("Unexpected status {status} from {url}")]
    Status { status: StatusCode, url: String },

    /// Invalid URL provided or built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The response body was not valid JSON.
    #[error("Failed to decode JSON: {0}")]
    DecodeError(serde_json::Error),

    /// The JSON payload did not match the expected response shape.
    ///
    /// `schema` names the shape that was attempted (for example `"article list"`).
    #[error("Response did not match the {schema} schema: {source}")]
    Validation {
        schema: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// HTML parsing or rewriting errors.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// File write errors.
    ///
    /// Wraps standard I/O errors for the output directory and article files.
    #[error("Failed to write to file: {0}")]
    WriteError(#[from] std::io::Error),
}

impl MigrateError {
    /// Returns true for failures of the transport itself (network, timeout, status).
    ///
    /// Transport failures and validation failures both trigger the fallback
    /// path; the distinction only changes how the failure is reported.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            MigrateError::HttpError(_) | MigrateError::Timeout { .. } | MigrateError::Status { .. }
        )
    }

    /// Returns true when the payload arrived but had the wrong shape.
    pub fn is_validation(&self) -> bool {
        matches!(self, MigrateError::Validation { .. } | MigrateError::DecodeError(_))
    }
}

/// Result type alias for MigrateError.
pub type Result<T> = std::result::Result<T, MigrateError>;
