// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Page proxy API endpoint
//!
//! Provides the `/fetch` HTTP endpoint that fetches a page and rewrites its
//! visible text.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::fetch_handler;
pub use request::FetchApiRequest;
pub use response::FetchApiResponse;
