// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Parser;
use faleproxy::{api::start_server, cli::Cli, config::ProxyConfig, version};
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = ProxyConfig::from_env();
    cli.apply(&mut config);
    config.validate()?;

    tracing::info!("Starting {}", version::get_version_string());
    tracing::info!(
        "Rewriting '{}' -> '{}' (skipping: {})",
        config.rewrite.target,
        config.rewrite.replacement,
        config.rewrite.skip_tags.join(", ")
    );

    start_server(config).await
}
