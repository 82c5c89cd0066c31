//! SearXNG web search and headless-browser page fetching as MCP tools
//!
//! The server exposes `web_search`, backed by a SearXNG instance's JSON API,
//! and `get_url_content`, backed by a Chromium instance that is started in
//! the background when the process launches.

pub mod browser_setup;
pub mod config;
pub mod error;
pub mod mcp;
pub mod scraper;
pub mod utils;
pub mod web_search;

pub use browser_setup::{download_managed_browser, find_browser_executable, launch_browser};
pub use config::{ConfigError, RetryPolicy, ScraperConfig, ServerConfig};
pub use error::{ToolError, ToolResult};
pub use mcp::{SearxngServer, ToolDispatcher};
pub use scraper::{
    BackendFactory, ChromiumScraper, ContentFetcher, PageContent, ReadinessManager, ScrapeBackend,
    ScrapeResult, ScraperHandle, ScraperPhase, chromium_factory,
};
pub use web_search::{SafeSearch, SearchClient, SearchQuery, SearchResult, TimeRange};
