// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Command line and environment configuration of the agent binary.

use crate::services::pipeline::{PipelineConfig, DEFAULT_USER_AGENT};
use crate::services::retriever::OversizePolicy;
use crate::services::robots_cache::RobotsConfig;
use clap::{Parser, ValueEnum};
use std::time::Duration;
use tracing::info;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Every flag can also be set through the environment variable named next to it.
#[derive(Debug, Clone, Parser)]
#[command(name = "fetch-agent", version, about = "Fetches web pages as Markdown")]
pub struct Settings {
    /// Port the HTTP server listens on
    #[arg(long, env = "FETCH_PORT", default_value_t = 8080)]
    pub port: u16,

    /// User-Agent sent with robots.txt and content requests
    #[arg(long, env = "USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Skip robots.txt checks entirely
    #[arg(long, env = "IGNORE_ROBOTS_TXT")]
    pub ignore_robots_txt: bool,

    /// Route all outbound requests through this proxy
    #[arg(long, env = "PROXY_URL")]
    pub proxy_url: Option<String>,

    /// Deadline for a content request, in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Deadline for a robots.txt request, in seconds
    #[arg(long, env = "ROBOTS_TIMEOUT_SECS", default_value_t = 5)]
    pub robots_timeout_secs: u64,

    /// How long a parsed robots.txt stays cached, in seconds
    #[arg(long, env = "ROBOTS_TTL_SECS", default_value_t = 3600)]
    pub robots_ttl_secs: u64,

    /// How long the allow-all fallback after a failed robots.txt fetch stays cached
    #[arg(long, env = "ROBOTS_FAILURE_TTL_SECS", default_value_t = 300)]
    pub robots_failure_ttl_secs: u64,

    /// Largest response body read, in bytes
    #[arg(long, env = "MAX_BODY_BYTES", default_value_t = 10 * 1024 * 1024)]
    pub max_body_bytes: usize,

    /// What to do with bodies over the limit: truncate or fail
    #[arg(long, env = "OVERSIZE_POLICY", default_value_t = OversizePolicy::Truncate)]
    pub oversize_policy: OversizePolicy,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Settings {
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            user_agent: self.user_agent.clone(),
            ignore_robots_txt: self.ignore_robots_txt,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            robots: RobotsConfig {
                fetch_timeout: Duration::from_secs(self.robots_timeout_secs),
                ttl: Duration::from_secs(self.robots_ttl_secs),
                failure_ttl: Duration::from_secs(self.robots_failure_ttl_secs),
            },
            max_body_bytes: self.max_body_bytes,
            oversize_policy: self.oversize_policy,
            proxy_url: self.proxy_url.clone().filter(|url| !url.is_empty()),
        }
    }

    /// Log the effective configuration. The proxy URL is not logged as it may
    /// carry credentials.
    pub fn log_startup(&self) {
        info!(
            port = self.port,
            user_agent = %self.user_agent,
            ignore_robots_txt = self.ignore_robots_txt,
            proxy = self.proxy_url.is_some(),
            request_timeout_secs = self.request_timeout_secs,
            max_body_bytes = self.max_body_bytes,
            oversize_policy = %self.oversize_policy,
            "Configuration loaded"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::try_parse_from(["fetch-agent"]).unwrap();
        let config = settings.pipeline_config();

        assert_eq!(settings.port, 8080);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.robots.fetch_timeout, Duration::from_secs(5));
        assert_eq!(config.robots.ttl, Duration::from_secs(3600));
        assert_eq!(config.robots.failure_ttl, Duration::from_secs(300));
        assert_eq!(config.max_body_bytes, 10_485_760);
        assert_eq!(config.oversize_policy, OversizePolicy::Truncate);
        assert_eq!(settings.log_format, LogFormat::Text);
    }

    #[test]
    fn test_flags_override_defaults() {
        let settings = Settings::try_parse_from([
            "fetch-agent",
            "--port",
            "9000",
            "--user-agent",
            "TestBot/2.0",
            "--ignore-robots-txt",
            "--proxy-url",
            "http://proxy.local:3128",
            "--oversize-policy",
            "fail",
            "--log-format",
            "json",
        ])
        .unwrap();
        let config = settings.pipeline_config();

        assert_eq!(settings.port, 9000);
        assert_eq!(config.user_agent, "TestBot/2.0");
        assert!(config.ignore_robots_txt);
        assert_eq!(config.proxy_url.as_deref(), Some("http://proxy.local:3128"));
        assert_eq!(config.oversize_policy, OversizePolicy::Fail);
        assert_eq!(settings.log_format, LogFormat::Json);
    }

    #[test]
    fn test_empty_proxy_is_no_proxy() {
        let settings = Settings::try_parse_from(["fetch-agent", "--proxy-url", ""]).unwrap();
        assert!(settings.pipeline_config().proxy_url.is_none());
    }

    #[test]
    fn test_invalid_oversize_policy_rejected() {
        assert!(Settings::try_parse_from(["fetch-agent", "--oversize-policy", "explode"]).is_err());
    }
}
