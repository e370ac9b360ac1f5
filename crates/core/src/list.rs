//! Resolving the slugs of an account's articles.
//!
//! The structured list endpoint is tried first. Any failure there (network,
//! status, decode, or validation) falls back to scanning the rendered profile
//! page. Only the first page of the API listing is used.

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::fetch::{Endpoints, Transport};
use crate::parse::Document;
use crate::schema::ArticleListResponse;
use crate::{MigrateError, Result};

/// Lists article slugs for `username`, newest first when the API answers.
///
/// Returns an error only when the profile page fallback fails too. An empty
/// list is a valid outcome.
pub async fn list_articles<T: Transport>(transport: &T, endpoints: &Endpoints, username: &str) -> Result<Vec<String>> {
    info!("Fetching article list for {}...", username);

    match list_from_api(transport, endpoints, username).await {
        Ok(slugs) => Ok(slugs),
        Err(e) => {
            warn!(error = %e, "Error fetching article list");
            info!("Falling back to HTML parsing...");
            list_from_profile(transport, endpoints, username).await
        }
    }
}

async fn list_from_api<T: Transport>(transport: &T, endpoints: &Endpoints, username: &str) -> Result<Vec<String>> {
    let url = endpoints.article_list(username)?;
    let response = transport.get(&url).await?.error_for_status(&url)?;

    let value: Value = serde_json::from_str(&response.body).map_err(MigrateError::DecodeError)?;
    let list = ArticleListResponse::from_value(value).inspect_err(|e| {
        warn!(error = %e, "API response validation failed");
    })?;

    if let Some(page) = list.next_page {
        debug!(next_page = page, "Further pages are not followed");
    }

    info!("Found {} articles via API", list.articles.len());
    Ok(list.slugs())
}

async fn list_from_profile<T: Transport>(
    transport: &T, endpoints: &Endpoints, username: &str,
) -> Result<Vec<String>> {
    let url = endpoints.profile_page(username)?;
    let response = transport.get(&url).await?;
    if !response.is_success() {
        debug!(status = %response.status, "Profile page returned a non-success status; scanning anyway");
    }

    let slugs = Document::parse(&response.body)?.article_slugs();
    info!("Found {} articles via HTML parsing", slugs.len());
    Ok(slugs)
}
