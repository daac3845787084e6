// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! End-to-end proxy tests
//!
//! Runs a local upstream server and proxies it through the real
//! `HttpFetcher`, the way a caller would hit the deployed service.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::{Html, Redirect},
    routing::get,
    Router,
};
use faleproxy::{
    api::{create_app, AppState},
    config::ProxyConfig,
    content::{FetchConfig, HttpFetcher, PageFetcher},
};
use scraper::Selector;
use serde_json::Value;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower::util::ServiceExt;

const NOSCRIPT_HTML: &str =
    r#"<html><head></head><body><noscript><img src="https://yale.edu/p.gif"></noscript><p>Yale</p></body></html>"#;

const LATIN1_HTML: &[u8] = b"<html><head></head><body><p>Yale caf\xE9</p></body></html>";

const SAMPLE_HTML_WITH_YALE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Yale University Test Page</title>
  <style>.yale-blue { color: #00356b; } /* Yale */</style>
</head>
<body>
  <header>
    <nav>
      <a href="https://www.yale.edu/about">About Yale</a>
      <a href="https://www.yale.edu/admissions">Admissions</a>
    </nav>
  </header>
  <h1>Welcome to Yale University</h1>
  <p>Yale University is a private Ivy League research university in New Haven, Connecticut.</p>
  <p>YALE was founded in 1701; yale alumni say YaLe sometimes.</p>
  <img src="https://www.yale.edu/logo.png" alt="Yale Logo">
  <script>window.school = "Yale";</script>
</body>
</html>"#;

/// Helper: start an upstream server on an ephemeral port
async fn spawn_upstream() -> SocketAddr {
    let app = Router::new()
        .route("/", get(|| async { Html(SAMPLE_HTML_WITH_YALE) }))
        .route(
            "/data.json",
            get(|| async {
                (
                    [(header::CONTENT_TYPE, "application/json")],
                    r#"{"school":"Yale"}"#,
                )
            }),
        )
        .route("/noscript", get(|| async { Html(NOSCRIPT_HTML) }))
        .route(
            "/latin1",
            get(|| async {
                (
                    [(header::CONTENT_TYPE, "text/html; charset=iso-8859-1")],
                    LATIN1_HTML,
                )
            }),
        )
        .route("/loop", get(|| async { Redirect::temporary("/loop") }))
        .route(
            "/missing",
            get(|| async { (StatusCode::NOT_FOUND, "no such page") }),
        );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Helper: proxy app allowed to reach the loopback upstream
fn proxy_app() -> Router {
    let mut config = ProxyConfig::default();
    config.fetch.block_private_hosts = false;
    config.fetch.timeout_secs = 5;
    create_app(AppState::from_config(&config).unwrap())
}

async fn proxy(url: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/fetch")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::json!({ "url": url }).to_string()))
        .unwrap();

    let response = proxy_app().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn select_text(document: &scraper::Html, selector: &str) -> String {
    let selector = Selector::parse(selector).unwrap();
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_replaces_yale_with_fale_in_fetched_content() {
    let addr = spawn_upstream().await;
    let url = format!("http://{}/", addr);

    let (status, body) = proxy(&url).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["originalUrl"], url.as_str());

    let document = scraper::Html::parse_document(body["content"].as_str().unwrap());
    assert_eq!(select_text(&document, "title"), "Fale University Test Page");
    assert_eq!(select_text(&document, "h1"), "Welcome to Fale University");
    assert!(select_text(&document, "p").contains("Fale University is a private"));
    assert_eq!(select_text(&document, "a"), "About Fale");
    assert_eq!(
        select_text(&document, "p:nth-of-type(2)"),
        "FALE was founded in 1701; fale alumni say YaLe sometimes."
    );
}

#[tokio::test]
async fn test_urls_and_hidden_text_unchanged() {
    let addr = spawn_upstream().await;
    let (status, body) = proxy(&format!("http://{}/", addr)).await;
    assert_eq!(status, StatusCode::OK);

    let content = body["content"].as_str().unwrap();
    let document = scraper::Html::parse_document(content);

    let links = Selector::parse("a").unwrap();
    let hrefs: Vec<&str> = document
        .select(&links)
        .filter_map(|a| a.value().attr("href"))
        .collect();
    assert_eq!(
        hrefs,
        vec![
            "https://www.yale.edu/about",
            "https://www.yale.edu/admissions"
        ]
    );

    let img = Selector::parse("img").unwrap();
    let img = document.select(&img).next().unwrap();
    assert_eq!(img.value().attr("alt"), Some("Yale Logo"));
    assert_eq!(img.value().attr("src"), Some("https://www.yale.edu/logo.png"));

    assert!(content.contains(r#"window.school = "Yale";"#));
    assert!(content.contains("/* Yale */"));
}

#[tokio::test]
async fn test_non_html_content_passed_through() {
    let addr = spawn_upstream().await;
    let (status, body) = proxy(&format!("http://{}/data.json", addr)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], r#"{"school":"Yale"}"#);
    assert!(body["title"].is_null());
}

#[tokio::test]
async fn test_upstream_error_status_returns_500() {
    let addr = spawn_upstream().await;
    let (status, body) = proxy(&format!("http://{}/missing", addr)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("HTTP 404"));
}

#[tokio::test]
async fn test_unreachable_upstream_returns_500() {
    // Bind then drop to get a port nothing listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (status, _) = proxy(&format!("http://{}/", addr)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_invalid_url_returns_500() {
    let (status, _) = proxy("not-a-valid-url").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_missing_url_returns_400() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/fetch")
        .header("content-type", "application/json")
        .body(Body::from("{}"))
        .unwrap();

    let response = proxy_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["error"], "URL is required");
}

#[tokio::test]
async fn test_noscript_markup_survives_proxy() {
    let addr = spawn_upstream().await;
    let (status, body) = proxy(&format!("http://{}/noscript", addr)).await;

    assert_eq!(status, StatusCode::OK);
    let content = body["content"].as_str().unwrap();
    assert!(content.contains(r#"<noscript><img src="https://yale.edu/p.gif"></noscript>"#));
    assert!(content.contains("<p>Fale</p>"));
}

#[tokio::test]
async fn test_declared_charset_is_decoded() {
    let addr = spawn_upstream().await;
    let url = format!("http://{}/latin1", addr);

    let fetcher = HttpFetcher::new(FetchConfig {
        block_private_hosts: false,
        ..FetchConfig::default()
    })
    .unwrap();
    let page = fetcher.fetch(&url).await.unwrap();
    assert!(page.body.contains("<p>Yale caf\u{e9}</p>"));
    assert!(!page.body.contains('\u{fffd}'));

    let (status, body) = proxy(&url).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["content"].as_str().unwrap().contains("<p>Fale caf\u{e9}</p>"));
}

#[tokio::test]
async fn test_redirect_loop_returns_500() {
    let addr = spawn_upstream().await;
    let (status, body) = proxy(&format!("http://{}/loop", addr)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Too many redirects"));
}
