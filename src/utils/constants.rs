//! Shared configuration constants for the SearXNG tools
//!
//! This module contains default values and configuration constants used
//! throughout the codebase to ensure consistency and avoid magic numbers.

/// Default SearXNG instance: a local install on its standard port
///
/// Overridden by the `SEARXNG_URL` environment variable.
pub const DEFAULT_SEARXNG_URL: &str = "http://localhost:8080";

/// Environment variable naming the SearXNG base URL
pub const SEARXNG_URL_ENV: &str = "SEARXNG_URL";

/// Environment variable overriding the page fetch budget in seconds
pub const FETCH_TIMEOUT_ENV: &str = "FETCH_TIMEOUT_SECS";

/// Default result page requested from SearXNG (1-indexed)
pub const DEFAULT_PAGENO: u32 = 1;

/// Default number of results requested per page
pub const DEFAULT_RESULT_COUNT: u32 = 10;

/// Language value meaning "no language filter"; never forwarded upstream
pub const LANGUAGE_ALL: &str = "all";

/// Page fetch budget: 10 seconds
///
/// Applied around a single scrape call. Search requests carry no explicit
/// timeout and rely on the HTTP client defaults.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Browser initialization attempts before scraping is disabled for good
///
/// Attempt 1 runs at startup, attempts 2-5 are scheduled retries.
pub const MAX_INIT_RETRIES: u32 = 5;

/// Delay before the first initialization retry: 15 seconds
///
/// Doubles for each further retry: 15s, 30s, 60s, 120s.
pub const INITIAL_RETRY_DELAY_MS: u64 = 15_000;

/// Scrape result cache capacity: 1000 pages
pub const SCRAPE_CACHE_SIZE: usize = 1000;

/// Returned by `get_url_content` while the browser is still starting
pub const TOOL_NOT_READY_MESSAGE: &str =
    "Tool not ready. The browser is still initializing, please try again in a few moments.";

/// Returned by the content fetcher when no browser instance is live
pub const NOT_READY_MESSAGE: &str = "Puppeteer is not ready. Please try again in a few moments.";

/// Desktop Chrome user agent sent by the headless browser
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";
