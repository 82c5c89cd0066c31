//! Core configuration types for the SearXNG tool server
//!
//! `ServerConfig` is assembled once at startup and handed to the components
//! that need it. `ScraperConfig` is the fixed construction config for the
//! browser backend and `RetryPolicy` drives its initialization backoff.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::utils::constants::{
    DEFAULT_FETCH_TIMEOUT_SECS, INITIAL_RETRY_DELAY_MS, MAX_INIT_RETRIES, SCRAPE_CACHE_SIZE,
};

/// Configuration errors raised while loading `ServerConfig`
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid SearXNG URL '{value}': {reason}")]
    InvalidSearxngUrl { value: String, reason: String },

    #[error("Invalid fetch timeout '{0}': expected a positive number of seconds")]
    InvalidFetchTimeout(String),
}

/// Construction config for the headless browser scraping backend
///
/// The defaults are the values the server always runs with; tests and
/// embedders may override them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScraperConfig {
    pub(crate) headless: bool,
    pub(crate) ignore_https_errors: bool,
    pub(crate) block_resources: bool,
    pub(crate) cache_size: usize,
    pub(crate) enable_gpu: bool,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            headless: true,
            ignore_https_errors: true,
            block_resources: false,
            cache_size: SCRAPE_CACHE_SIZE,
            enable_gpu: false,
        }
    }
}

impl ScraperConfig {
    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }

    #[must_use]
    pub fn ignore_https_errors(&self) -> bool {
        self.ignore_https_errors
    }

    #[must_use]
    pub fn block_resources(&self) -> bool {
        self.block_resources
    }

    #[must_use]
    pub fn cache_size(&self) -> usize {
        self.cache_size
    }

    #[must_use]
    pub fn enable_gpu(&self) -> bool {
        self.enable_gpu
    }

    #[must_use]
    pub fn with_block_resources(mut self, block: bool) -> Self {
        self.block_resources = block;
        self
    }

    #[must_use]
    pub fn with_cache_size(mut self, size: usize) -> Self {
        self.cache_size = size;
        self
    }
}

/// Bounded exponential backoff for scraper initialization
///
/// `max_retries` counts every attempt including the first one, so the
/// default of 5 yields 4 scheduled retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub(crate) max_retries: u32,
    pub(crate) initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_INIT_RETRIES,
            initial_delay: Duration::from_millis(INITIAL_RETRY_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_retries: u32, initial_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
        }
    }

    #[must_use]
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    #[must_use]
    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    /// Delay before the next attempt after attempt `retry_count` failed
    ///
    /// Returns `None` once the budget is spent: `retry_count` must stay below
    /// `max_retries - 1` for another attempt to be scheduled.
    #[must_use]
    pub fn retry_delay(&self, retry_count: u32) -> Option<Duration> {
        if retry_count >= self.max_retries.saturating_sub(1) {
            return None;
        }
        let factor = 2u32.saturating_pow(retry_count);
        Some(self.initial_delay.saturating_mul(factor))
    }
}

/// Top-level server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub(crate) searxng_url: Url,
    pub(crate) fetch_timeout: Duration,
    pub(crate) scraper: ScraperConfig,
    pub(crate) retry: RetryPolicy,
}

impl ServerConfig {
    /// Create a config pointing at `searxng_url` with every other value defaulted
    pub fn new(searxng_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            searxng_url: parse_searxng_url(searxng_url)?,
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            scraper: ScraperConfig::default(),
            retry: RetryPolicy::default(),
        })
    }

    #[must_use]
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_scraper(mut self, scraper: ScraperConfig) -> Self {
        self.scraper = scraper;
        self
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn searxng_url(&self) -> &Url {
        &self.searxng_url
    }

    #[must_use]
    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    #[must_use]
    pub fn scraper(&self) -> &ScraperConfig {
        &self.scraper
    }

    #[must_use]
    pub fn retry(&self) -> RetryPolicy {
        self.retry
    }
}

/// Parse and validate a SearXNG base URL
///
/// Only `http` and `https` bases are accepted so that the search path can
/// always be appended.
pub fn parse_searxng_url(value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim()).map_err(|e| ConfigError::InvalidSearxngUrl {
        value: value.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidSearxngUrl {
            value: value.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}
