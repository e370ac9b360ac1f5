//! End-to-end migration through an in-memory transport
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::{Value, json};
use tempfile::TempDir;
use url::Url;
use zenn_migrate_core::*;

#[derive(Default)]
struct MockSite {
    pages: HashMap<String, HttpResponse>,
    hits: RefCell<Vec<String>>,
}

impl MockSite {
    fn route(mut self, path: &str, status: StatusCode, body: impl Into<String>) -> Self {
        self.pages.insert(format!("https://zenn.dev{}", path), HttpResponse::new(status, body));
        self
    }

    fn hits(&self) -> Vec<String> {
        self.hits.borrow().clone()
    }
}

impl Transport for MockSite {
    async fn get(&self, url: &Url) -> Result<HttpResponse> {
        self.hits.borrow_mut().push(url.to_string());
        self.pages
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| MigrateError::InvalidUrl(format!("no route for {}", url)))
    }
}

fn metadata(slug: &str, title: &str) -> Value {
    json!({
        "id": 42,
        "post_type": "Article",
        "title": title,
        "slug": slug,
        "comments_count": 0,
        "liked_count": 12,
        "body_letters_count": 800,
        "article_type": "tech",
        "emoji": "🦀",
        "is_suspending_private": false,
        "published_at": "2024-03-01T09:00:00.000+09:00",
        "topics": ["a", {"id": 5, "name": "b"}]
    })
}

fn migrator(site: MockSite, tmp: &TempDir) -> Migrator<MockSite> {
    let config = MigrateConfig::builder()
        .output_dir(tmp.path().join("articles"))
        .delay(Duration::ZERO)
        .build();
    Migrator::new(site, &Url::parse("https://zenn.dev").unwrap(), config).unwrap()
}

#[tokio::test]
async fn test_two_articles_api_then_page_fallback() {
    let mut article_a = metadata("aaa111", "First");
    article_a["body_markdown"] = json!("Hello from the API");

    let next_data = json!({
        "props": { "pageProps": { "article": {
            "slug": "bbb222",
            "title": "Second",
            "emoji": "📦",
            "article_type": "idea",
            "topics": [{"name": "c"}],
            "published": true,
            "body_markdown": "Hello from the page"
        }}}
    });
    let page_b = format!(
        r#"<html><head><script id="__NEXT_DATA__" type="application/json">{}</script></head><body><h1>Second</h1></body></html>"#,
        next_data
    );

    let site = MockSite::default()
        .route(
            "/api/articles?username=alice&order=latest",
            StatusCode::OK,
            json!({ "articles": [metadata("aaa111", "First"), metadata("bbb222", "Second")], "next_page": null })
                .to_string(),
        )
        .route("/api/articles/aaa111", StatusCode::OK, json!({ "article": article_a }).to_string())
        .route("/api/articles/bbb222", StatusCode::NOT_FOUND, "Not Found")
        .route("/alice/articles/bbb222", StatusCode::OK, page_b);

    let tmp = TempDir::new().unwrap();
    let migrator = migrator(site, &tmp);
    let summary = migrator.run("alice").await.unwrap();

    assert_eq!(summary.to_string(), "Success: 2, Failed: 0");

    let first = fs::read_to_string(migrator.store().article_path("aaa111")).unwrap();
    assert_eq!(
        first,
        "---\ntitle: \"First\"\nemoji: \"🦀\"\ntype: \"tech\"\ntopics: [\"a\", \"b\"]\npublished: true\n---\n\nHello from the API"
    );

    let second = fs::read_to_string(migrator.store().article_path("bbb222")).unwrap();
    assert!(second.contains("emoji: \"📦\""));
    assert!(second.contains("type: \"idea\""));
    assert!(second.contains("topics: [\"c\"]"));
    assert!(second.ends_with("\n\nHello from the page"));
}

#[tokio::test]
async fn test_profile_fallback_and_metadata_only_article() {
    let site = MockSite::default()
        .route("/api/articles?username=bob&order=latest", StatusCode::TOO_MANY_REQUESTS, "")
        .route(
            "/bob",
            StatusCode::OK,
            r#"<a href="/bob/articles/m1">One</a><a href="/bob/articles/m1">One</a><a href="/bob/articles/h2">Two</a>"#,
        )
        .route("/api/articles/m1", StatusCode::OK, metadata("m1", "Meta only").to_string())
        .route(
            "/api/articles/h2",
            StatusCode::OK,
            {
                let mut detail = metadata("h2", "Converted");
                detail["body_html"] = json!(
                    r##"<h2 id="s"><a class="header-anchor-link" href="#s"></a>Section</h2><p>Para</p><span class="zenn-embedded zenn-embedded-tweet"><iframe data-content="https%3A%2F%2Fx.com%2Fi%2Fstatus%2F1"></iframe></span>"##
                );
                json!({ "article": detail }).to_string()
            },
        );

    let tmp = TempDir::new().unwrap();
    let migrator = migrator(site, &tmp);
    let summary = migrator.run("bob").await.unwrap();

    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed_slugs, vec!["m1"]);

    let metadata_file = fs::read_to_string(migrator.store().metadata_path("m1")).unwrap();
    let record: Value = serde_json::from_str(&metadata_file).unwrap();
    assert_eq!(record["title"], "Meta only");
    assert_eq!(record["topics"], json!(["a", "b"]));
    assert!(!migrator.store().article_path("m1").exists());

    let converted = fs::read_to_string(migrator.store().article_path("h2")).unwrap();
    assert!(converted.lines().any(|l| l == "## Section"));
    assert!(converted.lines().any(|l| l == "https://x.com/i/status/1"));
    assert!(!converted.contains("header-anchor"));
}

#[tokio::test]
async fn test_api_listing_skips_profile_page() {
    let site = MockSite::default().route(
        "/api/articles?username=carol&order=latest",
        StatusCode::OK,
        json!({ "articles": [] }).to_string(),
    );

    let tmp = TempDir::new().unwrap();
    let migrator = migrator(site, &tmp);
    let slugs = migrator.list("carol").await.unwrap();

    assert!(slugs.is_empty());
    assert_eq!(
        migrator.transport().hits(),
        vec!["https://zenn.dev/api/articles?username=carol&order=latest"]
    );
}

#[tokio::test]
async fn test_write_failure_aborts_run() {
    let mut detail = metadata("w1", "Unwritable");
    detail["body"] = json!("body");
    let site = MockSite::default()
        .route(
            "/api/articles?username=dave&order=latest",
            StatusCode::OK,
            json!({ "articles": [metadata("w1", "Unwritable")] }).to_string(),
        )
        .route("/api/articles/w1", StatusCode::OK, detail.to_string());

    let tmp = TempDir::new().unwrap();
    let migrator = migrator(site, &tmp);
    migrator.store().ensure_dir().unwrap();
    fs::create_dir(migrator.store().article_path("w1")).unwrap();

    let result = migrator.run("dave").await;
    assert!(matches!(result, Err(MigrateError::WriteError(_))));
}

#[tokio::test]
async fn test_fetch_single_article_without_writing() {
    let mut detail = metadata("s1", "Seq");
    detail["body_markdown"] = json!("x");
    let site = MockSite::default().route("/api/articles/s1", StatusCode::OK, detail.to_string());

    let tmp = TempDir::new().unwrap();
    let migrator = migrator(site, &tmp);
    let article = migrator.fetch("erin", "s1").await.unwrap();
    assert_eq!(article.content, "x");
    assert!(!migrator.store().article_path("s1").exists());
}
