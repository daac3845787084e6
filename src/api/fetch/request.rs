// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Fetch API request types

use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;

/// Request body for POST /fetch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchApiRequest {
    /// Absolute URL of the page to proxy (required)
    #[serde(default)]
    pub url: Option<String>,
}

impl FetchApiRequest {
    /// Validate the request, returning the URL to fetch
    pub fn validate(&self) -> Result<&str, ApiError> {
        match self.url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Ok(url),
            _ => Err(ApiError::MissingUrl),
        }
    }
}
