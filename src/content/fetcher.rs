// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Outbound HTTP page fetching
//!
//! One GET per call. No retries and no caching; redirects are followed up
//! to the configured limit, and every hop passes the same host guard as the
//! requested URL.

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, redirect::Policy, Client};
use std::error::Error as StdError;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::{Host, Url};

use super::config::FetchConfig;

/// Media types handed to the rewriter; everything else passes through
const HTML_MEDIA_TYPES: &[&str] = &["text/html", "application/xhtml+xml"];

/// A fetched upstream response
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL that was requested
    pub url: String,
    /// HTTP status of the final response
    pub status: u16,
    /// Raw `Content-Type` header, if any
    pub content_type: Option<String>,
    /// Body decoded with the charset named in `Content-Type`, UTF-8 if none
    pub body: String,
}

impl FetchedPage {
    /// Whether the body should go through the HTML rewriter
    ///
    /// A missing content type is treated as non-HTML.
    pub fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .map(is_html_media_type)
            .unwrap_or(false)
    }
}

/// Content fetch error types
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// URL could not be parsed or is not http(s)
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// URL targets localhost or a private network
    #[error("Unsafe URL blocked: {0}")]
    UnsafeUrl(String),

    /// Request timed out
    #[error("Timeout fetching: {0}")]
    Timeout(String),

    /// Transport level failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// Redirect chain exceeded `max_redirects`
    #[error("Too many redirects fetching: {0}")]
    TooManyRedirects(String),

    /// Upstream answered with a non-success status
    #[error("HTTP {status} for: {url}")]
    HttpStatus { status: u16, url: String },

    /// Response body could not be read
    #[error("Failed to read body from {url}: {message}")]
    Body { url: String, message: String },

    /// HTTP client could not be constructed
    #[error("Failed to create HTTP client: {0}")]
    Client(String),
}

/// Source of upstream pages
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch a single absolute http(s) URL
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// reqwest-backed [`PageFetcher`]
pub struct HttpFetcher {
    client: Client,
    config: FetchConfig,
}

impl HttpFetcher {
    /// Create a new fetcher
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .redirect(redirect_policy(&config))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Get the configuration
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Parse and vet a caller-supplied URL
    pub fn parse_url(&self, url: &str) -> Result<Url, FetchError> {
        let parsed =
            Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", url, e)))?;

        if !["http", "https"].contains(&parsed.scheme()) {
            return Err(FetchError::InvalidUrl(format!(
                "{}: unsupported scheme '{}'",
                url,
                parsed.scheme()
            )));
        }

        if self.config.block_private_hosts && !is_public_host(&parsed) {
            return Err(FetchError::UnsafeUrl(url.to_string()));
        }

        Ok(parsed)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let parsed = self.parse_url(url)?;

        debug!("Fetching content from: {}", parsed);

        let response = self.client.get(parsed).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(url.to_string())
            } else if let Some(rejected) = redirect_rejection(&e) {
                rejected
            } else {
                FetchError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.text_with_charset("utf-8").await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(url.to_string())
            } else {
                FetchError::Body {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        info!(
            "Fetched {} bytes ({}) from: {}",
            body.len(),
            content_type.as_deref().unwrap_or("no content type"),
            url
        );

        Ok(FetchedPage {
            url: url.to_string(),
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}

/// Redirect policy enforcing the hop limit and, when enabled, the host guard
fn redirect_policy(config: &FetchConfig) -> Policy {
    let max_redirects = config.max_redirects;
    let block_private_hosts = config.block_private_hosts;

    Policy::custom(move |attempt| {
        let verdict = check_redirect(
            attempt.url(),
            attempt.previous().len(),
            max_redirects,
            block_private_hosts,
        );
        match verdict {
            Ok(()) => attempt.follow(),
            Err(e) => {
                warn!("Redirect refused: {}", e);
                attempt.error(e)
            }
        }
    })
}

/// Vet one redirect hop. `visited` counts the URLs already requested in the
/// chain, the original one included.
pub fn check_redirect(
    target: &Url,
    visited: usize,
    max_redirects: usize,
    block_private_hosts: bool,
) -> Result<(), FetchError> {
    if visited >= max_redirects {
        return Err(FetchError::TooManyRedirects(target.to_string()));
    }

    if !["http", "https"].contains(&target.scheme()) {
        return Err(FetchError::InvalidUrl(format!(
            "{}: unsupported redirect scheme '{}'",
            target,
            target.scheme()
        )));
    }

    if block_private_hosts && !is_public_host(target) {
        return Err(FetchError::UnsafeUrl(target.to_string()));
    }

    Ok(())
}

/// Recover the [`FetchError`] raised by the redirect policy, if any
fn redirect_rejection(err: &reqwest::Error) -> Option<FetchError> {
    if !err.is_redirect() {
        return None;
    }

    let mut source = err.source();
    while let Some(inner) = source {
        if let Some(rejected) = inner.downcast_ref::<FetchError>() {
            return Some(rejected.clone());
        }
        source = inner.source();
    }
    None
}

/// Whether a `Content-Type` value names an HTML media type
pub fn is_html_media_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    HTML_MEDIA_TYPES.contains(&essence.as_str())
}

/// Check if URL host is safe to fetch (not localhost/private IP)
pub fn is_public_host(url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(domain)) => {
            let domain = domain.trim_end_matches('.').to_ascii_lowercase();
            domain != "localhost" && !domain.ends_with(".localhost")
        }
        Some(Host::Ipv4(ip)) => is_public_ipv4(ip),
        Some(Host::Ipv6(ip)) => is_public_ipv6(ip),
        None => false,
    }
}

fn is_public_ipv4(ip: Ipv4Addr) -> bool {
    !(ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_unspecified()
        || ip.is_broadcast())
}

fn is_public_ipv6(ip: Ipv6Addr) -> bool {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_public_ipv4(v4);
    }

    let first = ip.segments()[0];
    let unique_local = (first & 0xfe00) == 0xfc00;
    let link_local = (first & 0xffc0) == 0xfe80;

    !(ip.is_loopback() || ip.is_unspecified() || unique_local || link_local)
}
