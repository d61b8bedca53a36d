// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use crate::error::FetchError;
use serde::{Deserialize, Serialize};

/// Request to fetch a single URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    /// The absolute URL to fetch
    pub url: String,
    /// Maximum number of characters to return
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Character offset to start returning content from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_index: Option<usize>,
    /// Return the response body without HTML simplification
    #[serde(default)]
    pub raw: bool,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_length: None,
            start_index: None,
            raw: false,
        }
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn with_start_index(mut self, start_index: usize) -> Self {
        self.start_index = Some(start_index);
        self
    }

    pub fn with_raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }

    /// Parse the URL and check the request parameters.
    pub fn validate(&self) -> Result<url::Url, FetchError> {
        let invalid = |reason: String| FetchError::InvalidRequest {
            url: self.url.clone(),
            reason,
        };

        let parsed = url::Url::parse(&self.url).map_err(|e| invalid(format!("Invalid URL: {}", e)))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
        }
        if parsed.host_str().is_none() {
            return Err(invalid("URL has no host".to_string()));
        }
        if self.max_length == Some(0) {
            return Err(invalid("max_length must be greater than zero".to_string()));
        }

        Ok(parsed)
    }
}

/// Response of a single HTTP retrieval
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// The URL that was fetched
    pub url: String,
    /// Decoded response body
    pub body: String,
    /// Content-Type header value (empty if absent)
    pub content_type: String,
    /// HTTP status code
    pub status: u16,
    /// Number of body bytes read
    pub byte_length: usize,
    /// Whether the body was cut at the configured size cap
    pub truncated: bool,
}

impl FetchResult {
    /// Whether the content-type announces an HTML document.
    pub fn is_html(&self) -> bool {
        let content_type = self.content_type.to_ascii_lowercase();
        content_type.contains("text/html") || content_type.contains("application/xhtml+xml")
    }
}

/// Error body returned by the HTTP surface
#[derive(Debug, Serialize, Deserialize)]
pub struct FetchErrorResponse {
    pub error: String,
    pub url: String,
}
