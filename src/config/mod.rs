// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Process-wide configuration
//!
//! Loaded once at startup from the environment (a `.env` file is honoured
//! by the binary) and optionally overridden by CLI flags.

use std::env;
use std::net::SocketAddr;
use thiserror::Error;

use crate::content::{FetchConfig, RewriteConfig};

/// Invalid configuration value
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid {field}: {reason}")]
    Invalid { field: String, reason: String },
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Top-level service configuration
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Interface to bind (default: 0.0.0.0)
    pub host: String,
    /// Port to listen on (default: 3001)
    pub port: u16,
    pub fetch: FetchConfig,
    pub rewrite: RewriteConfig,
}

impl ProxyConfig {
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
            host: lookup("FALEPROXY_HOST")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            fetch: FetchConfig::from_lookup(&lookup),
            rewrite: RewriteConfig::from_lookup(&lookup),
        }
    }

    /// Socket address the server binds to
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::invalid("host", format!("{}: {}", self.host, e)))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;
        self.fetch.validate()?;
        self.rewrite.validate()?;
        Ok(())
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            fetch: FetchConfig::default(),
            rewrite: RewriteConfig::default(),
        }
    }
}
