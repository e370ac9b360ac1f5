//! In-memory transport for unit tests.

use std::cell::RefCell;
use std::collections::HashMap;

use reqwest::StatusCode;
use serde_json::Value;
use url::Url;

use crate::fetch::{HttpResponse, Transport};
use crate::{MigrateError, Result};

/// Serves canned responses keyed by full URL. Unknown URLs fail like a dropped connection.
#[derive(Default)]
pub struct FakeTransport {
    routes: HashMap<String, HttpResponse>,
    requested: RefCell<Vec<String>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, url: &str, status: StatusCode, body: impl Into<String>) -> Self {
        self.routes.insert(url.to_string(), HttpResponse::new(status, body));
        self
    }

    pub fn json(self, url: &str, body: Value) -> Self {
        self.respond(url, StatusCode::OK, body.to_string())
    }

    pub fn html(self, url: &str, body: &str) -> Self {
        self.respond(url, StatusCode::OK, body)
    }

    pub fn was_requested(&self, url: &str) -> bool {
        self.requested.borrow().iter().any(|u| u == url)
    }
}

impl Transport for FakeTransport {
    async fn get(&self, url: &Url) -> Result<HttpResponse> {
        self.requested.borrow_mut().push(url.to_string());
        self.routes.get(url.as_str()).cloned().ok_or(MigrateError::Timeout { timeout: 0 })
    }
}
