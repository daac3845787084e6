// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for Faleproxy

/// Semantic version number
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Service name reported by the health endpoint
pub const SERVICE_NAME: &str = env!("CARGO_PKG_NAME");

/// Get full version string
pub fn get_version_string() -> String {
    format!("{} v{}", SERVICE_NAME, VERSION)
}
