// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Per-origin robots policy cache and the gate that consults it.
//!
//! The [`OriginCache`] is the only state shared between requests. Each origin
//! has a slot holding its current policy and a refresh lock. Readers of a
//! fresh policy only take a short synchronous read lock; a stale or missing
//! policy is refreshed by exactly one task while concurrent callers for the
//! same origin wait on the refresh lock and then reuse its result.

use crate::services::robots::{RobotsParseError, RobotsPolicy};
use reqwest::header::USER_AGENT;
use reqwest::{Client, StatusCode};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use texting_robots::get_robots_url;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

/// Bytes of robots.txt that are read; anything beyond is ignored
const MAX_ROBOTS_BYTES: usize = 500 * 1024;

/// Scheme, host and port: the unit a robots.txt governs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Origin {
    scheme: String,
    host: String,
    port: u16,
}

impl Origin {
    /// Origin of `url`, or `None` if it has no host or known port.
    pub fn from_url(url: &Url) -> Option<Self> {
        Some(Self {
            scheme: url.scheme().to_ascii_lowercase(),
            host: url.host_str()?.to_ascii_lowercase(),
            port: url.port_or_known_default()?,
        })
    }

    /// Location of this origin's robots.txt.
    pub fn robots_url(&self) -> String {
        let origin = self.to_string();
        get_robots_url(&origin).unwrap_or_else(|_| format!("{}/robots.txt", origin))
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.scheme, self.host, self.port)
    }
}

#[derive(Default)]
struct OriginSlot {
    policy: RwLock<Option<Arc<RobotsPolicy>>>,
    refresh: Mutex<()>,
}

impl OriginSlot {
    fn fresh_policy(&self) -> Option<Arc<RobotsPolicy>> {
        self.policy
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .filter(|policy| policy.is_fresh())
            .cloned()
    }

    fn replace(&self, policy: Arc<RobotsPolicy>) {
        *self.policy.write().unwrap_or_else(PoisonError::into_inner) = Some(policy);
    }
}

/// Process-lifetime mapping from [`Origin`] to its robots policy.
#[derive(Default)]
pub struct OriginCache {
    slots: RwLock<HashMap<Origin, Arc<OriginSlot>>>,
}

impl OriginCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, origin: &Origin) -> Arc<OriginSlot> {
        if let Some(slot) = self
            .slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(origin)
        {
            return slot.clone();
        }

        self.slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(origin.clone())
            .or_default()
            .clone()
    }

    /// Cached policy for `origin` if present and not expired.
    pub fn fresh_policy(&self, origin: &Origin) -> Option<Arc<RobotsPolicy>> {
        self.slot(origin).fresh_policy()
    }

    /// Return the fresh policy for `origin`, running `refresh` to replace it
    /// when absent or expired.
    ///
    /// At most one `refresh` runs per origin at a time. Callers arriving while
    /// it is in flight wait for it and observe the policy it stored. If the
    /// refreshing future is dropped the lock is released and the next waiter
    /// refreshes instead.
    pub async fn get_or_refresh<F, Fut>(&self, origin: &Origin, refresh: F) -> Arc<RobotsPolicy>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = RobotsPolicy>,
    {
        let slot = self.slot(origin);
        if let Some(policy) = slot.fresh_policy() {
            return policy;
        }

        let _guard = slot.refresh.lock().await;
        if let Some(policy) = slot.fresh_policy() {
            return policy;
        }

        let policy = Arc::new(refresh().await);
        slot.replace(policy.clone());
        policy
    }

    /// Number of origins with a slot.
    pub fn len(&self) -> usize {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Timeouts and lifetimes for robots.txt handling.
#[derive(Debug, Clone)]
pub struct RobotsConfig {
    /// Deadline for a single robots.txt fetch
    pub fetch_timeout: Duration,
    /// Lifetime of a successfully parsed policy
    pub ttl: Duration,
    /// Lifetime of the permissive policy installed after a failed fetch
    pub failure_ttl: Duration,
}

impl Default for RobotsConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(5),
            ttl: Duration::from_secs(60 * 60),
            failure_ttl: Duration::from_secs(5 * 60),
        }
    }
}

/// Outcome of a robots check, with the reason the policy is permissive when
/// its fetch failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotsCheck {
    pub allowed: bool,
    pub error: Option<String>,
}

/// Decides whether a URL may be fetched according to its origin's robots.txt.
pub struct RobotsGate {
    client: Client,
    user_agent: String,
    ignore_robots_txt: bool,
    config: RobotsConfig,
    cache: OriginCache,
}

impl RobotsGate {
    pub fn new(
        client: Client,
        user_agent: impl Into<String>,
        ignore_robots_txt: bool,
        config: RobotsConfig,
    ) -> Self {
        Self {
            client,
            user_agent: user_agent.into(),
            ignore_robots_txt,
            config,
            cache: OriginCache::new(),
        }
    }

    pub fn cache(&self) -> &OriginCache {
        &self.cache
    }

    /// Whether `url` may be fetched.
    pub async fn is_allowed(&self, url: &Url) -> bool {
        self.check(url).await.allowed
    }

    /// Check `url` against its origin's policy, fetching robots.txt if needed.
    pub async fn check(&self, url: &Url) -> RobotsCheck {
        if self.ignore_robots_txt {
            return RobotsCheck {
                allowed: true,
                error: None,
            };
        }

        let Some(origin) = Origin::from_url(url) else {
            return RobotsCheck {
                allowed: true,
                error: Some("URL has no origin".to_string()),
            };
        };

        let policy = self
            .cache
            .get_or_refresh(&origin, || self.fetch_policy(&origin))
            .await;

        let mut target = url.clone();
        target.set_fragment(None);

        RobotsCheck {
            allowed: policy.is_allowed(target.as_str()),
            error: policy.fallback_reason().map(str::to_string),
        }
    }

    async fn fetch_policy(&self, origin: &Origin) -> RobotsPolicy {
        let robots_url = origin.robots_url();
        debug!(robots_url = %robots_url, "Fetching robots.txt");

        let parsed = self.download(&robots_url).await.and_then(|body| {
            RobotsPolicy::from_body(&self.user_agent, &body, self.config.ttl)
                .map_err(|e| e.to_string())
        });

        match parsed {
            Ok(policy) => {
                info!(
                    robots_url = %robots_url,
                    sitemaps = policy.sitemaps().len(),
                    "Cached robots.txt policy"
                );
                policy
            }
            Err(reason) => {
                warn!(
                    robots_url = %robots_url,
                    reason = %reason,
                    "robots.txt unavailable, allowing all paths"
                );
                RobotsPolicy::allow_all(reason, self.config.failure_ttl)
            }
        }
    }

    async fn download(&self, robots_url: &str) -> Result<Vec<u8>, String> {
        let mut response = self
            .client
            .get(robots_url)
            .header(USER_AGENT, &self.user_agent)
            .timeout(self.config.fetch_timeout)
            .send()
            .await
            .map_err(|e| format!("failed to fetch robots.txt: {}", e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(format!("robots.txt returned HTTP {}", status.as_u16()));
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| format!("failed to read robots.txt: {}", e))?
        {
            let remaining = MAX_ROBOTS_BYTES - body.len();
            if chunk.len() >= remaining {
                body.extend_from_slice(&chunk[..remaining]);
                debug!(limit = MAX_ROBOTS_BYTES, "robots.txt truncated");
                break;
            }
            body.extend_from_slice(&chunk);
        }

        let text_len = robots_text_len(&body).map_err(|e| e.to_string())?;
        body.truncate(text_len);
        Ok(body)
    }
}

/// Length of the UTF-8 text in a robots.txt body. A multi-byte character cut
/// at the end by the size limit is dropped.
fn robots_text_len(bytes: &[u8]) -> Result<usize, RobotsParseError> {
    match std::str::from_utf8(bytes) {
        Ok(_) => Ok(bytes.len()),
        Err(e) if e.error_len().is_none() => Ok(e.valid_up_to()),
        Err(_) => Err(RobotsParseError::NotText),
    }
}
