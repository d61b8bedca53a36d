// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Local test site served on 127.0.0.1 so tests never touch the network.

#![allow(dead_code)]

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::sleep;

pub const SCENARIO_HTML: &str =
    "<html><body><script>evil()</script><h1>Title</h1><p>Body text</p></body></html>";

pub const ARTICLE_HTML: &str = r#"<html><head><title>News</title></head><body>
<nav><a href="/">Home</a> <a href="/about">About</a></nav>
<article>
<h1>Release notes</h1>
<p>The new release brings faster startup, smaller binaries, and a <a href="/changelog">full changelog</a>.</p>
<ul><li>Faster</li><li>Smaller</li></ul>
</article>
<footer>Copyright 2026</footer>
</body></html>"#;

pub const PLAIN_TEXT: &str = "plain <b>text</b> stays as is";

pub const BIG_BODY_BYTES: usize = 64 * 1024;

/// Levels of `<div>` nesting served by `/deep`
pub const DEEP_NESTING: usize = 4000;

pub fn deep_html() -> String {
    format!(
        "{}deep text{}",
        "<div>".repeat(DEEP_NESTING),
        "</div>".repeat(DEEP_NESTING)
    )
}

/// How the site answers `/robots.txt`
#[derive(Clone)]
pub enum Robots {
    Body(&'static str),
    Status(StatusCode),
    Delayed(&'static str, Duration),
}

#[derive(Clone)]
pub struct Site {
    pub base: String,
    robots: Robots,
    robots_hits: Arc<AtomicUsize>,
    page_hits: Arc<AtomicUsize>,
}

impl Site {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn robots_hits(&self) -> usize {
        self.robots_hits.load(Ordering::SeqCst)
    }

    pub fn page_hits(&self) -> usize {
        self.page_hits.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.page_hits.fetch_add(1, Ordering::SeqCst);
    }
}

async fn robots_handler(State(site): State<Site>) -> Response {
    site.robots_hits.fetch_add(1, Ordering::SeqCst);
    match site.robots {
        Robots::Body(body) => body.into_response(),
        Robots::Status(status) => (status, "robots unavailable").into_response(),
        Robots::Delayed(body, delay) => {
            sleep(delay).await;
            body.into_response()
        }
    }
}

async fn scenario_handler(State(site): State<Site>) -> Html<&'static str> {
    site.hit();
    Html(SCENARIO_HTML)
}

async fn article_handler(State(site): State<Site>) -> Html<&'static str> {
    site.hit();
    Html(ARTICLE_HTML)
}

async fn private_handler(State(site): State<Site>) -> Html<&'static str> {
    site.hit();
    Html("<p>secret</p>")
}

async fn plain_handler(State(site): State<Site>) -> &'static str {
    site.hit();
    PLAIN_TEXT
}

async fn missing_handler(State(site): State<Site>) -> (StatusCode, &'static str) {
    site.hit();
    (StatusCode::NOT_FOUND, "no such page")
}

async fn big_handler(State(site): State<Site>) -> Response {
    site.hit();
    (
        [(header::CONTENT_TYPE, "text/plain")],
        "a".repeat(BIG_BODY_BYTES),
    )
        .into_response()
}

async fn deep_handler(State(site): State<Site>) -> Html<String> {
    site.hit();
    Html(deep_html())
}

async fn slow_handler(State(site): State<Site>) -> Html<&'static str> {
    site.hit();
    sleep(Duration::from_secs(10)).await;
    Html("<p>too late</p>")
}

/// Serve the test site on an ephemeral port.
pub async fn spawn_site(robots: Robots) -> Site {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let site = Site {
        base: format!("http://{}", addr),
        robots,
        robots_hits: Arc::new(AtomicUsize::new(0)),
        page_hits: Arc::new(AtomicUsize::new(0)),
    };

    let app = Router::new()
        .route("/robots.txt", get(robots_handler))
        .route("/scenario", get(scenario_handler))
        .route("/article", get(article_handler))
        .route("/private/page", get(private_handler))
        .route("/plain", get(plain_handler))
        .route("/missing", get(missing_handler))
        .route("/big", get(big_handler))
        .route("/deep", get(deep_handler))
        .route("/slow", get(slow_handler))
        .with_state(site.clone());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    site
}

/// Address nothing listens on.
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/page", addr)
}
