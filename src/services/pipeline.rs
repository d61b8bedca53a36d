// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! `Paginator(ContentTransformer(Retriever(RobotsGate(url))))`
//!
//! [`FetchPipeline`] owns the shared HTTP client, the robots gate with its
//! origin cache, and the transformer. It is cheap to share behind an `Arc`
//! and every request runs independently on the caller's task.

use crate::error::FetchError;
use crate::models::fetch::FetchRequest;
use crate::services::observer::{
    FetchCompletedEvent, FetchObserver, RobotsCheckEvent, TransformEvent,
};
use crate::services::paginator;
use crate::services::retriever::{build_http_client, OversizePolicy, Retriever};
use crate::services::robots_cache::{RobotsConfig, RobotsGate};
use crate::services::transform::{
    transform_checked, ContentTransformer, ReadableMarkdown, TransformError,
};
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Default user agent announced on every request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; MCPFetchBot/1.0)";

/// Everything the pipeline needs to know, independent of how it was configured.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub user_agent: String,
    pub ignore_robots_txt: bool,
    pub request_timeout: Duration,
    pub robots: RobotsConfig,
    pub max_body_bytes: usize,
    pub oversize_policy: OversizePolicy,
    pub proxy_url: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            ignore_robots_txt: false,
            request_timeout: Duration::from_secs(30),
            robots: RobotsConfig::default(),
            max_body_bytes: 10 * 1024 * 1024,
            oversize_policy: OversizePolicy::default(),
            proxy_url: None,
        }
    }
}

pub struct FetchPipeline {
    gate: RobotsGate,
    retriever: Retriever,
    transformer: Arc<dyn ContentTransformer>,
    observer: Option<Arc<dyn FetchObserver>>,
}

impl FetchPipeline {
    /// Build a pipeline with its own HTTP client.
    pub fn new(config: &PipelineConfig) -> reqwest::Result<Self> {
        let client = build_http_client(config.request_timeout, config.proxy_url.as_deref())?;
        Ok(Self::with_client(client, config))
    }

    /// Build a pipeline around a client supplied by the host.
    pub fn with_client(client: Client, config: &PipelineConfig) -> Self {
        Self {
            gate: RobotsGate::new(
                client.clone(),
                config.user_agent.clone(),
                config.ignore_robots_txt,
                config.robots.clone(),
            ),
            retriever: Retriever::new(
                client,
                config.user_agent.clone(),
                config.max_body_bytes,
                config.oversize_policy,
            ),
            transformer: Arc::new(ReadableMarkdown),
            observer: None,
        }
    }

    pub fn with_transformer(mut self, transformer: Arc<dyn ContentTransformer>) -> Self {
        self.transformer = transformer;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn FetchObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn robots_gate(&self) -> &RobotsGate {
        &self.gate
    }

    /// Fetch `request.url` and return its content, transformed and paginated.
    pub async fn fetch(&self, request: &FetchRequest) -> Result<String, FetchError> {
        let url = request.validate()?;

        self.check_robots(&url).await?;

        let started = Instant::now();
        let outcome = self.retriever.fetch(&url).await;
        if let Some(observer) = &self.observer {
            let error = outcome.as_ref().err().map(ToString::to_string);
            observer.on_fetch_completed(&FetchCompletedEvent {
                url: url.as_str(),
                status: match &outcome {
                    Ok(result) => Some(result.status),
                    Err(FetchError::HttpStatus { code, .. }) => Some(*code),
                    Err(_) => None,
                },
                bytes: outcome.as_ref().map(|r| r.byte_length).unwrap_or_default(),
                duration: started.elapsed(),
                error: error.as_deref(),
            });
        }
        let result = outcome?;

        let content = if !request.raw && result.is_html() {
            self.transform(&url, result.body).await
        } else {
            result.body
        };

        Ok(paginator::slice(
            &content,
            request.start_index,
            request.max_length,
        ))
    }

    /// [`fetch`](Self::fetch), abandoned with [`FetchError::Cancelled`] as
    /// soon as `cancel` fires.
    pub async fn fetch_with_cancel(
        &self,
        request: &FetchRequest,
        cancel: &CancellationToken,
    ) -> Result<String, FetchError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(FetchError::Cancelled {
                url: request.url.clone(),
            }),
            outcome = self.fetch(request) => outcome,
        }
    }

    async fn check_robots(&self, url: &Url) -> Result<(), FetchError> {
        let check = self.gate.check(url).await;
        if let Some(observer) = &self.observer {
            observer.on_robots_checked(&RobotsCheckEvent {
                url: url.as_str(),
                allowed: check.allowed,
                error: check.error.as_deref(),
            });
        }

        if check.allowed {
            Ok(())
        } else {
            Err(FetchError::RobotsDisallowed {
                url: url.to_string(),
            })
        }
    }

    /// Runs the transformer on the blocking pool. Failures keep the
    /// original HTML.
    async fn transform(&self, url: &Url, html: String) -> String {
        let started = Instant::now();
        let input_bytes = html.len();
        let html: Arc<str> = html.into();

        let job = {
            let transformer = self.transformer.clone();
            let html = html.clone();
            let base_url = url.clone();
            tokio::task::spawn_blocking(move || {
                transform_checked(transformer.as_ref(), &html, Some(&base_url))
            })
        };
        let (content, error) = match job.await {
            Ok(Ok(markdown)) => (markdown, None),
            Ok(Err(e)) => (html.to_string(), Some(e)),
            Err(e) => (html.to_string(), Some(TransformError::Panicked(e.to_string()))),
        };

        if let Some(observer) = &self.observer {
            let error = error.map(|e| e.to_string());
            observer.on_content_transformed(&TransformEvent {
                url: url.as_str(),
                input_bytes,
                output_bytes: content.len(),
                duration: started.elapsed(),
                error: error.as_deref(),
            });
        }

        content
    }
}
