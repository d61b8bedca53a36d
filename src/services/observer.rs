// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Hooks at the three pipeline boundaries.

use crate::services::logging::redact_url;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct RobotsCheckEvent<'a> {
    pub url: &'a str,
    pub allowed: bool,
    /// Why the policy in force is the permissive fallback
    pub error: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct FetchCompletedEvent<'a> {
    pub url: &'a str,
    /// Absent when no response arrived
    pub status: Option<u16>,
    pub bytes: usize,
    pub duration: Duration,
    pub error: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct TransformEvent<'a> {
    pub url: &'a str,
    pub input_bytes: usize,
    pub output_bytes: usize,
    pub duration: Duration,
    pub error: Option<&'a str>,
}

/// Receives pipeline events. Every hook defaults to doing nothing.
pub trait FetchObserver: Send + Sync {
    fn on_robots_checked(&self, _event: &RobotsCheckEvent<'_>) {}

    fn on_fetch_completed(&self, _event: &FetchCompletedEvent<'_>) {}

    fn on_content_transformed(&self, _event: &TransformEvent<'_>) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl FetchObserver for NoopObserver {}

/// Emits each event as a structured `tracing` record.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl FetchObserver for TracingObserver {
    fn on_robots_checked(&self, event: &RobotsCheckEvent<'_>) {
        let url = redact_url(event.url);
        match event.error {
            Some(error) => warn!(url = %url, allowed = event.allowed, error, "Robots check used fallback policy"),
            None if event.allowed => debug!(url = %url, "Robots check passed"),
            None => info!(url = %url, "Blocked by robots.txt"),
        }
    }

    fn on_fetch_completed(&self, event: &FetchCompletedEvent<'_>) {
        let url = redact_url(event.url);
        let elapsed_ms = event.duration.as_millis() as u64;
        match event.error {
            Some(error) => warn!(
                url = %url,
                status = event.status,
                elapsed_ms,
                error,
                "Fetch failed"
            ),
            None => info!(
                url = %url,
                status = event.status,
                bytes = event.bytes,
                elapsed_ms,
                "Fetch completed"
            ),
        }
    }

    fn on_content_transformed(&self, event: &TransformEvent<'_>) {
        let url = redact_url(event.url);
        let elapsed_ms = event.duration.as_millis() as u64;
        match event.error {
            Some(error) => warn!(
                url = %url,
                input_bytes = event.input_bytes,
                elapsed_ms,
                error,
                "Transform failed, returning original HTML"
            ),
            None => debug!(
                url = %url,
                input_bytes = event.input_bytes,
                output_bytes = event.output_bytes,
                elapsed_ms,
                "Transformed HTML to Markdown"
            ),
        }
    }
}
