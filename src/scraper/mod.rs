//! Headless browser scraping backend and its readiness lifecycle
//!
//! The browser is expensive and flaky to start, so it is never started on
//! the request path. A [`ReadinessManager`] owns the single backend instance
//! and initializes it in the background with bounded exponential backoff.
//! Everyone else holds a read-only [`ScraperHandle`] and checks readiness
//! without waiting.
//!
//! # Lifecycle
//! - `Uninitialized`: no instance exists
//! - `Initializing`: an instance is being constructed and launched, or a retry is pending
//! - `Ready`: init succeeded, the instance is published through the handle
//! - `Failed`: retry budget exhausted; scraping stays disabled for the process
//!
//! The [`ContentFetcher`] sits on top of the handle and turns a URL into the
//! page's plain text.

mod browser;
mod fetcher;
mod readiness;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::ScraperConfig;

pub use browser::{BrowserWrapper, ChromiumScraper, chromium_factory};
pub use fetcher::ContentFetcher;
pub use readiness::{
    ReadinessManager, RetryTimer, ScraperHandle, ScraperPhase, ScraperState, TokioTimer,
    Transition,
};

/// Text content extracted from a rendered page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContent {
    /// Visible text of the page body
    pub text: String,

    /// Document title, when the page has one
    pub title: Option<String>,

    /// Serialized DOM after rendering
    pub html: Option<String>,
}

/// Result of scraping a single URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeResult {
    /// URL the page ended up at
    pub url: String,

    pub content: PageContent,
}

/// A scraping backend the readiness manager can construct and initialize
///
/// Implementations are created through a [`BackendFactory`] once per
/// initialization attempt and are only handed out after `init` succeeded.
pub trait ScrapeBackend: Send + Sync {
    /// Start the backend (launch the browser, open connections)
    fn init(&self) -> BoxFuture<'_, anyhow::Result<()>>;

    /// Render `url` and extract its content
    ///
    /// `Ok(None)` means the page produced nothing to extract.
    fn scrape_page<'a>(&'a self, url: &'a str)
    -> BoxFuture<'a, anyhow::Result<Option<ScrapeResult>>>;

    /// Release backend resources; safe to call more than once
    fn shutdown(&self) -> BoxFuture<'_, anyhow::Result<()>> {
        Box::pin(async { Ok(()) })
    }
}

/// Constructs a fresh backend from the fixed scraper configuration
pub type BackendFactory = Arc<dyn Fn(&ScraperConfig) -> Arc<dyn ScrapeBackend> + Send + Sync>;
