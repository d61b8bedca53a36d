// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Application state, route handlers, and router construction.
//!
//! This module is `pub` so that integration tests can build a test router directly
//! without starting the full binary.

use crate::models::fetch::{FetchErrorResponse, FetchRequest};
use crate::models::tool::ToolDescriptor;
use crate::models::version::VersionResponse;
use crate::services::logging::redact_url;
use crate::services::pipeline::FetchPipeline;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tracing::info;

/// Application version extracted from `Cargo.toml` at compile time.
/// The patch segment can be overridden via `FETCH_AGENT_PATCH_VERSION` (see `build.rs`).
pub const VERSION: &str = env!("FETCH_AGENT_VERSION");

/// Name reported by `/version`
pub const AGENT_NAME: &str = "fetch-agent";

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Shared application state injected into every route handler via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<FetchPipeline>,
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

async fn version_handler() -> Json<VersionResponse> {
    Json(VersionResponse {
        agent: AGENT_NAME.to_string(),
        version: VERSION.to_string(),
    })
}

async fn tools_handler() -> Json<Vec<ToolDescriptor>> {
    Json(vec![ToolDescriptor::fetch()])
}

async fn fetch_handler(
    State(state): State<AppState>,
    Json(payload): Json<FetchRequest>,
) -> Response {
    match state.pipeline.fetch(&payload).await {
        Ok(content) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            content,
        )
            .into_response(),
        Err(e) => {
            let status = e.status_code();
            info!(
                url = %redact_url(e.url()),
                status = status.as_u16(),
                error = %e,
                "Fetch request failed"
            );
            (
                status,
                Json(FetchErrorResponse {
                    error: e.to_string(),
                    url: e.url().to_string(),
                }),
            )
                .into_response()
        }
    }
}

// ---------------------------------------------------------------------------
// Router construction
// ---------------------------------------------------------------------------

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/version", get(version_handler))
        .route("/tools", get(tools_handler))
        .route("/fetch", post(fetch_handler))
        .with_state(state)
}
