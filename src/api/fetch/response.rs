// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Fetch API response types

use serde::{Deserialize, Serialize};

/// Response body for POST /fetch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchApiResponse {
    /// Always true; failures are reported through [`crate::api::ErrorResponse`]
    pub success: bool,

    /// Rewritten HTML, or the unmodified body for non-HTML content
    pub content: String,

    /// Rewritten page title, when the page has one
    pub title: Option<String>,

    /// URL the caller asked for
    pub original_url: String,
}

impl FetchApiResponse {
    /// Create a new successful response
    pub fn new(content: String, title: Option<String>, original_url: String) -> Self {
        Self {
            success: true,
            content,
            title,
            original_url,
        }
    }
}
