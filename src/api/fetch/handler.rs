// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Fetch API endpoint handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::{debug, error, info, warn};

use super::request::FetchApiRequest;
use super::response::FetchApiResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::content::{FetchedPage, RewrittenPage};

/// POST /fetch - Fetch a page and rewrite its visible text
///
/// # Request
/// - `url`: Absolute http(s) URL of the page (required)
///
/// # Response
/// - `success`: Always `true`
/// - `content`: Rewritten HTML (non-HTML bodies are returned unmodified)
/// - `title`: Rewritten page title, or `null`
/// - `originalUrl`: The requested URL
///
/// # Errors
/// - 400 Bad Request: `url` missing, empty, or body is not a JSON object
/// - 500 Internal Server Error: malformed URL or the fetch failed
pub async fn fetch_handler(
    State(state): State<AppState>,
    payload: Result<Json<FetchApiRequest>, JsonRejection>,
) -> Result<Json<FetchApiResponse>, ApiError> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("Fetch request body rejected: {}", rejection.body_text());
            return Err(ApiError::MissingUrl);
        }
    };

    let url = match request.validate() {
        Ok(url) => url.to_string(),
        Err(e) => {
            warn!("Fetch validation failed: {}", e);
            return Err(e);
        }
    };

    debug!("Fetch request: {}", url);

    let page = state.fetcher.fetch(&url).await.map_err(|e| {
        error!("Fetch failed for {}: {}", url, e);
        ApiError::from(e)
    })?;

    let is_html = page.is_html();
    let bytes_in = page.body.len();

    let rewritten = if is_html {
        let rewriter = state.rewriter.clone();
        let html = page.body;
        tokio::task::spawn_blocking(move || rewriter.rewrite_document(&html))
            .await
            .map_err(|e| ApiError::Internal(format!("rewrite task failed: {}", e)))?
    } else {
        passthrough(page)
    };

    info!(
        "Proxied {} ({} bytes in, {} bytes out, html: {})",
        url,
        bytes_in,
        rewritten.html.len(),
        is_html
    );

    Ok(Json(FetchApiResponse::new(
        rewritten.html,
        rewritten.title,
        url,
    )))
}

fn passthrough(page: FetchedPage) -> RewrittenPage {
    debug!(
        "Passing through non-HTML content ({})",
        page.content_type.as_deref().unwrap_or("unknown")
    );

    RewrittenPage {
        html: page.body,
        title: None,
    }
}
