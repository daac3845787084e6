// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod cli;
pub mod config;
pub mod content;
pub mod version;

pub use api::{create_app, start_server, AppState};
pub use config::{ConfigError, ProxyConfig};
pub use content::{
    FetchConfig, FetchError, FetchedPage, HttpFetcher, PageFetcher, ReplacementRule,
    RewriteConfig, RewrittenPage, Rewriter, SkipSet,
};
