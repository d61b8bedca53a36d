// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Tracing setup and redaction of sensitive data before logging.

use tracing_subscriber::EnvFilter;
use url::Url;

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "fetch_agent=info";

/// Install the global tracing subscriber. Honours `RUST_LOG`; `json` switches
/// to one JSON object per line.
pub fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Redact a URL for logging.
/// Drops credentials, query and fragment: "https://u:p@host/a?k=v" -> "https://host/a"
pub fn redact_url(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            // Only fails for URLs that cannot carry credentials at all
            let _ = parsed.set_username("");
            let _ = parsed.set_password(None);
            parsed.set_query(None);
            parsed.set_fragment(None);
            parsed.to_string()
        }
        // Not a URL, keep nothing that might be a secret
        Err(_) => "<invalid url>".to_string(),
    }
}
