// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Error types surfaced by the fetch pipeline.
//!
//! [`FetchError`] is the single failure outcome of a request. Robots parse
//! problems and transform failures are absorbed inside their components and
//! never appear here.

use axum::http::StatusCode;
use std::fmt;
use thiserror::Error;

/// Coarse classification of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkErrorKind {
    /// The request deadline elapsed.
    Timeout,
    /// DNS resolution failed or the connection was refused/reset.
    Connect,
    /// The request could not be built or sent.
    Request,
    /// The connection broke while reading the body.
    Body,
    Other,
}

impl NetworkErrorKind {
    /// Classify a `reqwest` error.
    pub fn classify(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            NetworkErrorKind::Timeout
        } else if err.is_connect() {
            NetworkErrorKind::Connect
        } else if err.is_body() || err.is_decode() {
            NetworkErrorKind::Body
        } else if err.is_request() || err.is_builder() {
            NetworkErrorKind::Request
        } else {
            NetworkErrorKind::Other
        }
    }
}

impl fmt::Display for NetworkErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkErrorKind::Timeout => write!(f, "timeout"),
            NetworkErrorKind::Connect => write!(f, "connect"),
            NetworkErrorKind::Request => write!(f, "request"),
            NetworkErrorKind::Body => write!(f, "body"),
            NetworkErrorKind::Other => write!(f, "other"),
        }
    }
}

/// The failure outcome of a single fetch request.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("access to {url} is disallowed by robots.txt")]
    RobotsDisallowed { url: String },

    #[error("failed to fetch {url} ({kind}): {reason}")]
    Network {
        url: String,
        kind: NetworkErrorKind,
        reason: String,
    },

    #[error("HTTP {code} from {url}: {reason}")]
    HttpStatus {
        url: String,
        code: u16,
        reason: String,
    },

    #[error("invalid request for {url}: {reason}")]
    InvalidRequest { url: String, reason: String },

    #[error("response body from {url} exceeds the {limit} byte limit")]
    BodyTooLarge { url: String, limit: usize },

    #[error("fetch of {url} was cancelled")]
    Cancelled { url: String },
}

impl FetchError {
    pub(crate) fn network(url: &str, err: &reqwest::Error) -> Self {
        FetchError::Network {
            url: url.to_string(),
            kind: NetworkErrorKind::classify(err),
            reason: err.to_string(),
        }
    }

    /// The URL the failure relates to.
    pub fn url(&self) -> &str {
        match self {
            FetchError::RobotsDisallowed { url }
            | FetchError::Network { url, .. }
            | FetchError::HttpStatus { url, .. }
            | FetchError::InvalidRequest { url, .. }
            | FetchError::BodyTooLarge { url, .. }
            | FetchError::Cancelled { url } => url,
        }
    }

    /// HTTP status the host surface answers with for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            FetchError::RobotsDisallowed { .. } => StatusCode::FORBIDDEN,
            FetchError::Network {
                kind: NetworkErrorKind::Timeout,
                ..
            } => StatusCode::GATEWAY_TIMEOUT,
            FetchError::Network { .. } | FetchError::HttpStatus { .. } => StatusCode::BAD_GATEWAY,
            FetchError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            FetchError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            // 499 Client Closed Request is non-standard but always constructible.
            FetchError::Cancelled { .. } => {
                StatusCode::from_u16(499).unwrap_or(StatusCode::SERVICE_UNAVAILABLE)
            }
        }
    }
}
