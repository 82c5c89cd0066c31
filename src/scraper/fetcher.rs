//! URL content fetching on top of the scraping backend

use std::time::Duration;
use tracing::{debug, warn};

use super::readiness::ScraperHandle;
use crate::error::{ToolError, ToolResult};
use crate::utils::constants::DEFAULT_FETCH_TIMEOUT_SECS;

/// Fetches the plain text of a page through the shared backend
#[derive(Debug, Clone)]
pub struct ContentFetcher {
    scraper: ScraperHandle,
    timeout: Duration,
}

impl ContentFetcher {
    #[must_use]
    pub fn new(scraper: ScraperHandle) -> Self {
        Self {
            scraper,
            timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Return the extracted text of `url`
    ///
    /// Fails with [`ToolError::NotReady`] without touching the backend unless
    /// it is ready. Markup and other structured fields of the scrape result
    /// are dropped.
    pub async fn fetch_content(&self, url: &str) -> ToolResult<String> {
        let backend = self.scraper.backend().ok_or(ToolError::NotReady)?;

        debug!("Fetching content for {}", url);
        let scraped = tokio::time::timeout(self.timeout, backend.scrape_page(url))
            .await
            .map_err(|_| {
                warn!("Fetching {} timed out after {:?}", url, self.timeout);
                ToolError::Fetch(format!(
                    "Timed out after {}s fetching content from URL: {url}",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| ToolError::Fetch(format!("Failed to fetch {url}: {e:#}")))?;

        let result =
            scraped.ok_or_else(|| ToolError::Fetch(format!("Failed to fetch content from URL: {url}")))?;

        Ok(result.content.text)
    }
}
