//! HTTP access to the Zenn API and rendered pages.
//!
//! This module provides the [`Transport`] seam used by the lister and the
//! fetcher, its reqwest-backed implementation [`HttpClient`], and
//! [`Endpoints`], which builds every URL the migration touches from a single
//! base URL.

use std::future::Future;
use std::time::Duration;

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, PRAGMA, USER_AGENT};
use reqwest::{Client, RequestBuilder, StatusCode};
use url::Url;

use crate::{MigrateError, Result};

/// Base URL of the hosted platform.
pub const DEFAULT_BASE_URL: &str = "https://zenn.dev";

/// User-Agent sent with every request; the platform rejects obvious bots.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// HTTP client configuration.
///
/// Controls the base URL, optional timeout, and the browser-like header set
/// sent with every request.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL all endpoints are resolved against.
    pub base_url: Url,
    /// Request timeout in seconds. `None` keeps the transport default.
    pub timeout: Option<u64>,
    /// Custom User-Agent string.
    pub user_agent: String,
    /// Accept header value.
    pub accept: String,
    /// Accept-Language header value.
    pub accept_language: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: "application/json, text/plain, */*".to_string(),
            accept_language: "ja,en-US;q=0.9,en;q=0.8".to_string(),
        }
    }
}

/// Status and body of a completed request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Converts a non-2xx response into [`MigrateError::Status`].
    pub fn error_for_status(self, url: &Url) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(MigrateError::Status { status: self.status, url: url.to_string() })
        }
    }

    /// First `max` characters of the body, for log lines.
    pub fn excerpt(&self, max: usize) -> String {
        self.body.chars().take(max).collect()
    }
}

/// Something that can perform a GET and hand back status plus body text.
///
/// A non-2xx status is not an error at this level; callers decide how to
/// classify it. Network failures are returned as errors.
pub trait Transport {
    fn get(&self, url: &Url) -> impl Future<Output = Result<HttpResponse>>;
}

/// [`Transport`] backed by an async reqwest client.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    config: ClientConfig,
}

impl HttpClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(MigrateError::HttpError)?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// GET request carrying the browser-like header set.
    fn request(&self, url: &Url) -> RequestBuilder {
        self.client
            .get(url.clone())
            .header(USER_AGENT, &self.config.user_agent)
            .header(ACCEPT, &self.config.accept)
            .header(ACCEPT_LANGUAGE, &self.config.accept_language)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
    }
}

impl Transport for HttpClient {
    async fn get(&self, url: &Url) -> Result<HttpResponse> {
        let response = self
            .request(url)
            .send()
            .await
            .map_err(|e| match (e.is_timeout(), self.config.timeout) {
                (true, Some(timeout)) => MigrateError::Timeout { timeout },
                _ => MigrateError::HttpError(e),
            })?;

        let status = response.status();
        let body = response.text().await?;

        Ok(HttpResponse { status, body })
    }
}

/// URL builder for the four surfaces the migration reads.
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    pub fn new(base: &Url) -> Result<Self> {
        if base.cannot_be_a_base() {
            return Err(MigrateError::InvalidUrl(format!("{} cannot be used as a base URL", base)));
        }

        let mut base = base.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self { base })
    }

    fn join(&self, path: &str) -> Result<Url> {
        self.base.join(path).map_err(|e| MigrateError::InvalidUrl(e.to_string()))
    }

    /// `GET /api/articles?username=<id>&order=latest`
    pub fn article_list(&self, username: &str) -> Result<Url> {
        let mut url = self.join("api/articles")?;
        url.query_pairs_mut()
            .append_pair("username", username)
            .append_pair("order", "latest");
        Ok(url)
    }

    /// `GET /api/articles/<slug>`
    pub fn article_detail(&self, slug: &str) -> Result<Url> {
        self.join(&format!("api/articles/{}", slug))
    }

    /// `GET /<id>`
    pub fn profile_page(&self, username: &str) -> Result<Url> {
        self.join(username)
    }

    /// `GET /<id>/articles/<slug>`
    pub fn article_page(&self, username: &str, slug: &str) -> Result<Url> {
        self.join(&format!("{}/articles/{}", username, slug))
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self { base: ClientConfig::default().base_url }
    }
}
