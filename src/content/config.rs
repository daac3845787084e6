// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for fetching and rewriting
//!
//! Defines settings for the outbound HTTP fetch and the text replacement
//! applied to fetched pages.

use std::env;

use super::rewriter::DEFAULT_SKIP_TAGS;
use crate::config::ConfigError;
use crate::version::VERSION;

/// Configuration for outbound page fetches
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Timeout per fetch in seconds (default: 10)
    pub timeout_secs: u64,
    /// Maximum redirects followed (default: 5)
    pub max_redirects: usize,
    /// User-Agent header sent upstream
    pub user_agent: String,
    /// Refuse localhost and private network hosts (default: true)
    pub block_private_hosts: bool,
}

impl FetchConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            timeout_secs: lookup("FETCH_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout_secs),
            max_redirects: lookup("FETCH_MAX_REDIRECTS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_redirects)
                .min(20), // Cap at 20
            user_agent: lookup("FETCH_USER_AGENT")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.user_agent),
            block_private_hosts: lookup("FETCH_BLOCK_PRIVATE_HOSTS")
                .map(|v| !matches!(v.to_lowercase().as_str(), "false" | "0" | "no"))
                .unwrap_or(defaults.block_private_hosts),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "fetch.timeout_secs",
                "must be at least 1",
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::invalid(
                "fetch.user_agent",
                "cannot be empty",
            ));
        }
        Ok(())
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_redirects: 5,
            user_agent: format!("Mozilla/5.0 (compatible; Faleproxy/{})", VERSION),
            block_private_hosts: true,
        }
    }
}

/// Configuration for the text replacement
#[derive(Debug, Clone)]
pub struct RewriteConfig {
    /// Word to replace, as written (default: "Yale")
    pub target: String,
    /// Replacement word, as written (default: "Fale")
    pub replacement: String,
    /// Elements whose subtree is never rewritten
    pub skip_tags: Vec<String>,
}

impl RewriteConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            target: lookup("REWRITE_TARGET").unwrap_or(defaults.target),
            replacement: lookup("REWRITE_REPLACEMENT").unwrap_or(defaults.replacement),
            skip_tags: lookup("REWRITE_SKIP_TAGS")
                .map(|v| {
                    v.split(',')
                        .map(|t| t.trim().to_ascii_lowercase())
                        .filter(|t| !t.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.skip_tags),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target.is_empty() {
            return Err(ConfigError::invalid("rewrite.target", "cannot be empty"));
        }
        if self.replacement.is_empty() {
            return Err(ConfigError::invalid(
                "rewrite.replacement",
                "cannot be empty",
            ));
        }
        if let Some(tag) = self
            .skip_tags
            .iter()
            .find(|t| t.is_empty() || !t.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'))
        {
            return Err(ConfigError::invalid(
                "rewrite.skip_tags",
                format!("invalid tag name '{}'", tag),
            ));
        }
        Ok(())
    }
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            target: "Yale".to_string(),
            replacement: "Fale".to_string(),
            skip_tags: DEFAULT_SKIP_TAGS.iter().map(|t| t.to_string()).collect(),
        }
    }
}
