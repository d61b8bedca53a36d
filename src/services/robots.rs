// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! robots.txt policies.
//!
//! A [`RobotsPolicy`] wraps a [`texting_robots::Robot`] compiled once for our
//! user agent and never mutated. Refreshing an origin replaces the whole
//! policy.

use std::time::{Duration, Instant};
use texting_robots::Robot;
use thiserror::Error;

/// Product tokens that name no crawler and are skipped when picking ours.
const GENERIC_TOKENS: &[&str] = &["mozilla", "compatible"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RobotsParseError {
    #[error("robots.txt body is not valid UTF-8 text")]
    NotText,
    #[error("robots.txt could not be parsed: {0}")]
    Invalid(String),
}

/// The token robots.txt groups are matched against for `user_agent`.
///
/// A browser-style agent such as `Mozilla/5.0 (compatible; MCPFetchBot/1.0)`
/// is reduced to `mcpfetchbot`: the first versioned product that is not a
/// generic browser token. An agent without versions yields its first word.
pub fn product_token(user_agent: &str) -> String {
    let words: Vec<&str> = user_agent
        .split(|c: char| c.is_whitespace() || matches!(c, ';' | '(' | ')' | ','))
        .filter(|word| !word.is_empty())
        .collect();

    let product = |word: &&str| -> Option<String> {
        let name = word.split('/').next().unwrap_or_default().to_lowercase();
        (!name.is_empty() && !GENERIC_TOKENS.contains(&name.as_str())).then_some(name)
    };

    words
        .iter()
        .filter(|word| word.contains('/'))
        .find_map(product)
        .or_else(|| words.iter().find_map(product))
        .unwrap_or_else(|| user_agent.trim().to_lowercase())
}

/// Where a cached policy came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicySource {
    /// Parsed from a successfully fetched robots.txt
    Parsed,
    /// Permissive default installed after a failed fetch
    Fallback { reason: String },
}

/// Immutable robots policy for one origin.
#[derive(Debug)]
pub struct RobotsPolicy {
    robot: Option<Robot>,
    source: PolicySource,
    fetched_at: Instant,
    ttl: Duration,
}

impl RobotsPolicy {
    /// Compile a robots.txt body for `user_agent`.
    ///
    /// Groups are selected by [`product_token`]; without a named group the
    /// `*` group applies. Lines the parser does not understand are ignored.
    pub fn from_body(
        user_agent: &str,
        body: &[u8],
        ttl: Duration,
    ) -> Result<Self, RobotsParseError> {
        let robot = Robot::new(&product_token(user_agent), body)
            .map_err(|e| RobotsParseError::Invalid(format!("{:#}", e)))?;

        Ok(Self {
            robot: Some(robot),
            source: PolicySource::Parsed,
            fetched_at: Instant::now(),
            ttl,
        })
    }

    /// Permissive policy used when robots.txt could not be retrieved.
    pub fn allow_all(reason: impl Into<String>, ttl: Duration) -> Self {
        Self {
            robot: None,
            source: PolicySource::Fallback {
                reason: reason.into(),
            },
            fetched_at: Instant::now(),
            ttl,
        }
    }

    pub fn source(&self) -> &PolicySource {
        &self.source
    }

    /// Reason the policy fell back to allow-all, if it did.
    pub fn fallback_reason(&self) -> Option<&str> {
        match &self.source {
            PolicySource::Fallback { reason } => Some(reason),
            PolicySource::Parsed => None,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn is_fresh(&self) -> bool {
        self.fetched_at.elapsed() < self.ttl
    }

    /// `Crawl-delay` of the selected group, in seconds.
    pub fn crawl_delay(&self) -> Option<f32> {
        self.robot.as_ref().and_then(|robot| robot.delay)
    }

    /// `Sitemap` entries, which apply to every agent.
    pub fn sitemaps(&self) -> &[String] {
        self.robot
            .as_ref()
            .map(|robot| robot.sitemaps.as_slice())
            .unwrap_or_default()
    }

    /// Evaluate an absolute URL or a path with optional query.
    ///
    /// The longest matching pattern decides; Allow wins a tie of equal length.
    /// `/robots.txt` is always allowed.
    pub fn is_allowed(&self, url: &str) -> bool {
        self.robot.as_ref().is_none_or(|robot| robot.allowed(url))
    }
}
