// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use clap::Parser;

use crate::config::ProxyConfig;

/// Faleproxy: fetch a page and swap Yale for Fale in its visible text
#[derive(Parser, Debug)]
#[command(name = "faleproxy")]
#[command(version)]
#[command(about = "HTTP proxy that rewrites Yale to Fale in fetched pages", long_about = None)]
pub struct Cli {
    /// Interface to bind
    #[arg(long, env = "FALEPROXY_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, short, env = "PORT")]
    pub port: Option<u16>,

    /// Word to replace
    #[arg(long, env = "REWRITE_TARGET")]
    pub target: Option<String>,

    /// Replacement word
    #[arg(long, env = "REWRITE_REPLACEMENT")]
    pub replacement: Option<String>,
}

impl Cli {
    /// Apply command line overrides on top of the environment config
    pub fn apply(self, config: &mut ProxyConfig) {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(target) = self.target {
            config.rewrite.target = target;
        }
        if let Some(replacement) = self.replacement {
            config.rewrite.replacement = replacement;
        }
    }
}
