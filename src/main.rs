// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use anyhow::Context;
use clap::Parser;
use fetch_agent::app::{create_router, AppState, AGENT_NAME, VERSION};
use fetch_agent::config::{LogFormat, Settings};
use fetch_agent::services::logging::init_tracing;
use fetch_agent::services::observer::TracingObserver;
use fetch_agent::services::pipeline::FetchPipeline;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C, shutting down");
        return;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::parse();
    init_tracing(settings.log_format == LogFormat::Json);
    settings.log_startup();

    let pipeline = FetchPipeline::new(&settings.pipeline_config())
        .context("Failed to build HTTP client")?
        .with_observer(Arc::new(TracingObserver));

    let app = create_router(AppState {
        pipeline: Arc::new(pipeline),
    });

    // Bind to 0.0.0.0 to accept connections from any network interface (required for Docker)
    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(%addr, "{} v{} listening", AGENT_NAME, VERSION);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Server stopped");
    Ok(())
}
