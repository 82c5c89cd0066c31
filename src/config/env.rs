//! Environment loading for `ServerConfig`

use std::time::Duration;

use super::types::{ConfigError, ServerConfig};
use crate::utils::constants::{DEFAULT_SEARXNG_URL, FETCH_TIMEOUT_ENV, SEARXNG_URL_ENV};

impl ServerConfig {
    /// Load configuration from the process environment
    ///
    /// - `SEARXNG_URL`: SearXNG base URL (default `http://localhost:8080`)
    /// - `FETCH_TIMEOUT_SECS`: page fetch budget in seconds (default 10)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let base = read(SEARXNG_URL_ENV).unwrap_or_else(|| DEFAULT_SEARXNG_URL.to_string());
        let mut config = ServerConfig::new(&base)?;

        if let Some(raw) = read(FETCH_TIMEOUT_ENV) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidFetchTimeout(raw))?;
            config = config.with_fetch_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{RetryPolicy, ScraperConfig};
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.searxng_url().as_str(), "http://localhost:8080/");
        assert_eq!(config.fetch_timeout(), Duration::from_secs(10));
        assert_eq!(config.retry().max_retries(), 5);
        assert_eq!(config.retry().initial_delay(), Duration::from_millis(15_000));
        assert!(config.scraper().headless());
        assert!(config.scraper().ignore_https_errors());
        assert!(!config.scraper().block_resources());
        assert_eq!(config.scraper().cache_size(), 1000);
        assert!(!config.scraper().enable_gpu());
    }

    #[test]
    fn reads_searxng_url() {
        let config =
            ServerConfig::from_lookup(lookup(&[("SEARXNG_URL", "https://search.example.org/searx")]))
                .unwrap();
        assert_eq!(
            config.searxng_url().as_str(),
            "https://search.example.org/searx"
        );
    }

    #[test]
    fn empty_url_falls_back_to_default() {
        let config = ServerConfig::from_lookup(lookup(&[("SEARXNG_URL", "  ")])).unwrap();
        assert_eq!(config.searxng_url().host_str(), Some("localhost"));
    }

    #[test]
    fn rejects_non_http_url() {
        let err = ServerConfig::from_lookup(lookup(&[("SEARXNG_URL", "ftp://example.org")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSearxngUrl { .. }));
    }

    #[test]
    fn parses_fetch_timeout() {
        let config = ServerConfig::from_lookup(lookup(&[("FETCH_TIMEOUT_SECS", "25")])).unwrap();
        assert_eq!(config.fetch_timeout(), Duration::from_secs(25));

        let err = ServerConfig::from_lookup(lookup(&[("FETCH_TIMEOUT_SECS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFetchTimeout(_)));
    }

    #[test]
    fn builders_override_defaults() {
        let config = ServerConfig::new("http://127.0.0.1:8888")
            .unwrap()
            .with_scraper(ScraperConfig::default().with_block_resources(true).with_cache_size(8))
            .with_retry_policy(RetryPolicy::new(2, Duration::from_millis(100)));
        assert!(config.scraper().block_resources());
        assert_eq!(config.scraper().cache_size(), 8);
        assert_eq!(config.retry().max_retries(), 2);
        assert_eq!(config.retry().initial_delay(), Duration::from_millis(100));
        assert_eq!(config.fetch_timeout(), Duration::from_secs(10));
    }
}
