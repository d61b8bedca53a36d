// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use crate::error::FetchError;
use crate::models::fetch::FetchResult;
use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Proxy, Response, StatusCode};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Accept header favouring HTML and XML documents
pub const ACCEPT_HEADER: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// What to do when a response body is larger than the configured cap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OversizePolicy {
    /// Keep the first `max_body_bytes` bytes
    #[default]
    Truncate,
    /// Fail the request with [`FetchError::BodyTooLarge`]
    Fail,
}

impl FromStr for OversizePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "truncate" => Ok(OversizePolicy::Truncate),
            "fail" => Ok(OversizePolicy::Fail),
            _ => Err(format!(
                "oversize policy must be 'truncate' or 'fail', got: {}",
                value
            )),
        }
    }
}

impl fmt::Display for OversizePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OversizePolicy::Truncate => write!(f, "truncate"),
            OversizePolicy::Fail => write!(f, "fail"),
        }
    }
}

/// Build the shared HTTP client with a request deadline and optional proxy.
pub fn build_http_client(timeout: Duration, proxy_url: Option<&str>) -> reqwest::Result<Client> {
    let mut builder = Client::builder().timeout(timeout);
    if let Some(proxy_url) = proxy_url {
        builder = builder.proxy(Proxy::all(proxy_url)?);
    }
    builder.build()
}

/// Performs the single content GET of a request.
pub struct Retriever {
    client: Client,
    user_agent: String,
    max_body_bytes: usize,
    oversize_policy: OversizePolicy,
}

impl Retriever {
    pub fn new(
        client: Client,
        user_agent: impl Into<String>,
        max_body_bytes: usize,
        oversize_policy: OversizePolicy,
    ) -> Self {
        Self {
            client,
            user_agent: user_agent.into(),
            max_body_bytes,
            oversize_policy,
        }
    }

    /// GET `url` once. Any status other than 200 is an error; the body of an
    /// error response is drained and discarded.
    pub async fn fetch(&self, url: &Url) -> Result<FetchResult, FetchError> {
        let url_str = url.as_str();

        let mut response = self
            .client
            .get(url.clone())
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, ACCEPT_HEADER)
            .send()
            .await
            .map_err(|e| FetchError::network(url_str, &e))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        debug!(
            status = status.as_u16(),
            content_type = %content_type,
            "Received response headers"
        );

        if status != StatusCode::OK {
            self.drain(&mut response).await;
            return Err(FetchError::HttpStatus {
                url: url_str.to_string(),
                code: status.as_u16(),
                reason: status
                    .canonical_reason()
                    .unwrap_or("unknown status")
                    .to_string(),
            });
        }

        let (bytes, truncated) = self.read_body(url_str, &mut response).await?;

        Ok(FetchResult {
            url: url_str.to_string(),
            byte_length: bytes.len(),
            body: String::from_utf8_lossy(&bytes).into_owned(),
            content_type,
            status: status.as_u16(),
            truncated,
        })
    }

    /// Read the body up to `max_body_bytes`, applying the oversize policy.
    async fn read_body(
        &self,
        url: &str,
        response: &mut Response,
    ) -> Result<(Vec<u8>, bool), FetchError> {
        let mut body = Vec::new();

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| FetchError::network(url, &e))?
        {
            let remaining = self.max_body_bytes - body.len();
            if chunk.len() > remaining {
                match self.oversize_policy {
                    OversizePolicy::Fail => {
                        return Err(FetchError::BodyTooLarge {
                            url: url.to_string(),
                            limit: self.max_body_bytes,
                        })
                    }
                    OversizePolicy::Truncate => {
                        body.extend_from_slice(&chunk[..remaining]);
                        debug!(limit = self.max_body_bytes, "Response body truncated");
                        return Ok((body, true));
                    }
                }
            }
            body.extend_from_slice(&chunk);
        }

        Ok((body, false))
    }

    /// Discard up to `max_body_bytes` of an unwanted body so the connection
    /// can go back to the pool. Larger bodies are abandoned.
    async fn drain(&self, response: &mut Response) {
        let mut drained = 0;
        while let Ok(Some(chunk)) = response.chunk().await {
            drained += chunk.len();
            if drained > self.max_body_bytes {
                break;
            }
        }
    }
}
