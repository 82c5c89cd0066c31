//! Chromium-backed implementation of [`ScrapeBackend`]

use anyhow::{Context, Result};
use chromiumoxide::browser::Browser;
use chromiumoxide::page::Page;
use futures::future::BoxFuture;
use lru::LruCache;
use serde::Deserialize;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{BackendFactory, PageContent, ScrapeBackend, ScrapeResult};
use crate::browser_setup::launch_browser;
use crate::config::ScraperConfig;

const BODY_TEXT_SCRIPT: &str = "({ text: document.body ? document.body.innerText : null })";

#[derive(Deserialize)]
struct BodyText {
    text: Option<String>,
}

/// Browser plus its CDP event handler task and profile directory
///
/// The handler is aborted on drop so it cannot outlive the browser.
pub struct BrowserWrapper {
    browser: Browser,
    handler: JoinHandle<()>,
    user_data_dir: Option<PathBuf>,
}

impl BrowserWrapper {
    pub(crate) fn new(browser: Browser, handler: JoinHandle<()>, user_data_dir: PathBuf) -> Self {
        Self {
            browser,
            handler,
            user_data_dir: Some(user_data_dir),
        }
    }

    pub(crate) fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Close the browser, wait for the process to exit, then drop its profile
    pub async fn shutdown(&mut self) -> Result<()> {
        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            warn!("Failed to wait for browser exit: {}", e);
        }
        self.handler.abort();
        self.cleanup_temp_dir();
        Ok(())
    }

    /// Remove the profile directory
    ///
    /// Must run after the browser process exited, Windows refuses to delete
    /// files Chrome still holds open.
    pub fn cleanup_temp_dir(&mut self) {
        if let Some(path) = self.user_data_dir.take() {
            debug!("Removing browser profile {}", path.display());
            if let Err(e) = std::fs::remove_dir_all(&path) {
                warn!(
                    "Failed to remove browser profile {}: {}. Manual cleanup may be required.",
                    path.display(),
                    e
                );
            }
        }
    }
}

impl Drop for BrowserWrapper {
    fn drop(&mut self) {
        self.handler.abort();
        if self.user_data_dir.is_some() {
            warn!("BrowserWrapper dropped without shutdown, removing profile in Drop");
            self.cleanup_temp_dir();
        }
    }
}

/// Open tab that is closed on every exit path
///
/// A scrape cancelled by the caller's timeout drops its future mid-flight;
/// `Drop` then spawns `page.close()` so the tab does not linger in the
/// shared browser.
struct PageGuard {
    page: Page,
    url: String,
    closed: bool,
}

impl PageGuard {
    fn new(page: Page, url: &str) -> Self {
        Self {
            page,
            url: url.to_string(),
            closed: false,
        }
    }

    async fn close(mut self) {
        self.closed = true;
        if let Err(e) = self.page.clone().close().await {
            debug!("Failed to close page for {}: {}", self.url, e);
        }
    }
}

impl std::ops::Deref for PageGuard {
    type Target = Page;

    fn deref(&self) -> &Page {
        &self.page
    }
}

impl Drop for PageGuard {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        debug!("Closing abandoned page for {}", self.url);
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let page = self.page.clone();
                let url = std::mem::take(&mut self.url);
                runtime.spawn(async move {
                    if let Err(e) = page.close().await {
                        debug!("Failed to close abandoned page for {}: {}", url, e);
                    }
                });
            }
            Err(_) => warn!("No runtime to close page for {}", self.url),
        }
    }
}

/// Scrapes pages with a single shared headless Chromium
///
/// Results are kept in an LRU cache keyed by the requested URL, so repeated
/// fetches of the same page do not touch the browser.
pub struct ChromiumScraper {
    config: ScraperConfig,
    browser: RwLock<Option<BrowserWrapper>>,
    cache: Mutex<LruCache<String, ScrapeResult>>,
}

impl ChromiumScraper {
    #[must_use]
    pub fn new(config: ScraperConfig) -> Self {
        let capacity = NonZeroUsize::new(config.cache_size()).unwrap_or(NonZeroUsize::MIN);
        Self {
            config,
            browser: RwLock::new(None),
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    async fn launch(&self) -> Result<()> {
        let mut slot = self.browser.write().await;
        if slot.is_some() {
            return Ok(());
        }
        let (browser, handler, user_data_dir) = launch_browser(&self.config).await?;
        *slot = Some(BrowserWrapper::new(browser, handler, user_data_dir));
        Ok(())
    }

    async fn render(&self, url: &str) -> Result<Option<ScrapeResult>> {
        if let Some(hit) = self.cache.lock().await.get(url) {
            debug!("Cache hit for {}", url);
            return Ok(Some(hit.clone()));
        }

        let page = {
            let slot = self.browser.read().await;
            let wrapper = slot
                .as_ref()
                .context("Browser is not running")?;
            PageGuard::new(
                wrapper
                    .browser()
                    .new_page("about:blank")
                    .await
                    .context("Failed to create blank page")?,
                url,
            )
        };

        page.goto(url)
            .await
            .with_context(|| format!("Failed to open page for {url}"))?;
        let extracted = extract(&page, url).await;
        page.close().await;

        let Some(result) = extracted? else {
            return Ok(None);
        };
        self.cache
            .lock()
            .await
            .put(url.to_string(), result.clone());
        Ok(Some(result))
    }

    async fn close(&self) -> Result<()> {
        let wrapper = self.browser.write().await.take();
        if let Some(mut wrapper) = wrapper {
            info!("Shutting down browser");
            wrapper.shutdown().await?;
        }
        self.cache.lock().await.clear();
        Ok(())
    }
}

async fn extract(page: &Page, url: &str) -> Result<Option<ScrapeResult>> {
    page.wait_for_navigation()
        .await
        .with_context(|| format!("Navigation to {url} failed"))?;

    let body: BodyText = page
        .evaluate(BODY_TEXT_SCRIPT)
        .await
        .context("Failed to evaluate body text")?
        .into_value()
        .map_err(|e| anyhow::anyhow!("Failed to read body text: {e}"))?;

    let Some(text) = body.text else {
        debug!("{} has no document body", url);
        return Ok(None);
    };

    let title = match page.get_title().await {
        Ok(title) => title.filter(|t| !t.is_empty()),
        Err(e) => {
            debug!("Failed to read title of {}: {}", url, e);
            None
        }
    };
    let html = page.content().await.ok();
    let final_url = page
        .url()
        .await
        .ok()
        .flatten()
        .unwrap_or_else(|| url.to_string());

    Ok(Some(ScrapeResult {
        url: final_url,
        content: PageContent { text, title, html },
    }))
}

impl ScrapeBackend for ChromiumScraper {
    fn init(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(self.launch())
    }

    fn scrape_page<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Option<ScrapeResult>>> {
        Box::pin(self.render(url))
    }

    fn shutdown(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(self.close())
    }
}

/// Factory producing a fresh [`ChromiumScraper`] for every init attempt
#[must_use]
pub fn chromium_factory() -> BackendFactory {
    Arc::new(|config: &ScraperConfig| {
        Arc::new(ChromiumScraper::new(config.clone())) as Arc<dyn ScrapeBackend>
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scrape_before_init_fails() {
        let scraper = ChromiumScraper::new(ScraperConfig::default());
        let err = scraper
            .scrape_page("https://example.com")
            .await
            .expect_err("no browser launched");
        assert!(err.to_string().contains("not running"));
    }

    #[tokio::test]
    async fn shutdown_without_browser_is_noop() {
        let scraper = ChromiumScraper::new(ScraperConfig::default().with_cache_size(0));
        scraper.shutdown().await.expect("shutdown");
        scraper.shutdown().await.expect("second shutdown");
    }

    #[tokio::test]
    #[ignore = "requires a local Chrome/Chromium"]
    async fn scrapes_example_domain() {
        let scraper = ChromiumScraper::new(ScraperConfig::default());
        scraper.init().await.expect("launch browser");
        let result = scraper
            .scrape_page("https://example.com")
            .await
            .expect("scrape")
            .expect("content");
        assert!(result.content.text.contains("Example Domain"));
        assert_eq!(result.content.title.as_deref(), Some("Example Domain"));
        scraper.shutdown().await.expect("shutdown");
    }
}
