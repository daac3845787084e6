// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Page fetching and text rewriting
//!
//! ## Architecture
//!
//! ```text
//! URL → HttpFetcher → FetchedPage ─┬─ text/html → Rewriter → RewrittenPage
//!                                  └─ other     → passed through unchanged
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let fetcher = HttpFetcher::new(FetchConfig::from_env())?;
//! let rewriter = Rewriter::from_config(&RewriteConfig::from_env())?;
//!
//! let page = fetcher.fetch("https://www.yale.edu/").await?;
//! let rewritten = rewriter.rewrite_document(&page.body);
//! ```

pub mod config;
pub mod fetcher;
pub mod rewriter;
pub mod rule;

pub use config::{FetchConfig, RewriteConfig};
pub use fetcher::{is_html_media_type, FetchError, FetchedPage, HttpFetcher, PageFetcher};
pub use rewriter::{RewrittenPage, Rewriter, SkipSet, DEFAULT_SKIP_TAGS};
pub use rule::{ReplacementRule, RuleError};
