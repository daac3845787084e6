// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use super::fetch::fetch_handler;
use crate::config::ProxyConfig;
use crate::content::{HttpFetcher, PageFetcher, Rewriter};
use crate::version::{SERVICE_NAME, VERSION};

/// Shared per-process state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<dyn PageFetcher>,
    pub rewriter: Arc<Rewriter>,
}

impl AppState {
    pub fn new(fetcher: Arc<dyn PageFetcher>, rewriter: Arc<Rewriter>) -> Self {
        Self { fetcher, rewriter }
    }

    /// Build the production state described by `config`
    pub fn from_config(config: &ProxyConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(config.fetch.clone())?;
        let rewriter = Rewriter::from_config(&config.rewrite)?;
        Ok(Self::new(Arc::new(fetcher), Arc::new(rewriter)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_handler))
        // Page proxy
        .route("/fetch", post(fetch_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Bind, serve until Ctrl-C, then drain in-flight requests
pub async fn start_server(config: ProxyConfig) -> Result<()> {
    let state = AppState::from_config(&config)?;
    let app = create_app(state);

    let addr = config.bind_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("Faleproxy listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Faleproxy stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn health_handler(State(_state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: SERVICE_NAME.to_string(),
        version: VERSION.to_string(),
    })
}
