//! Shared fixtures for the integration tests

use futures::future::BoxFuture;
use kodegen_tools_searxng::scraper::{RetryTimer, ScraperHandle};
use kodegen_tools_searxng::{
    BackendFactory, PageContent, ReadinessManager, RetryPolicy, ScrapeBackend, ScrapeResult,
    ScraperConfig,
};
use rmcp::model as m;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory backend whose first `failures` inits fail
#[allow(dead_code)]
#[derive(Default)]
pub struct FakeBackend {
    pub failures: u32,
    pub page_text: Option<String>,
    pub hang: bool,
    pub tabs_opened: AtomicU32,
    pub tabs_closed: AtomicU32,
    pub constructed: AtomicU32,
    pub init_calls: AtomicU32,
    pub scrape_calls: AtomicU32,
    pub shutdown_calls: AtomicU32,
}

#[allow(dead_code)]
impl FakeBackend {
    pub fn failing(failures: u32) -> Arc<Self> {
        Arc::new(Self {
            failures,
            page_text: Some("fake page".to_string()),
            ..Self::default()
        })
    }

    pub fn serving(text: &str) -> Arc<Self> {
        Arc::new(Self {
            page_text: Some(text.to_string()),
            ..Self::default()
        })
    }

    /// Backend whose page loads never finish
    pub fn hanging() -> Arc<Self> {
        Arc::new(Self {
            hang: true,
            ..Self::default()
        })
    }

    pub fn open_tabs(&self) -> u32 {
        self.tabs_opened.load(Ordering::SeqCst) - self.tabs_closed.load(Ordering::SeqCst)
    }

    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Factory handing out this shared instance on every attempt
    pub fn factory(self: &Arc<Self>) -> BackendFactory {
        let backend = Arc::clone(self);
        Arc::new(move |_config: &ScraperConfig| {
            backend.constructed.fetch_add(1, Ordering::SeqCst);
            Arc::clone(&backend) as Arc<dyn ScrapeBackend>
        })
    }

    pub fn scrapes(&self) -> u32 {
        self.scrape_calls.load(Ordering::SeqCst)
    }
}

impl ScrapeBackend for FakeBackend {
    fn init(&self) -> BoxFuture<'_, anyhow::Result<()>> {
        Box::pin(async move {
            let attempt = self.init_calls.fetch_add(1, Ordering::SeqCst);
            if attempt < self.failures {
                anyhow::bail!("simulated launch failure {}", attempt + 1);
            }
            Ok(())
        })
    }

    fn scrape_page<'a>(
        &'a self,
        url: &'a str,
    ) -> BoxFuture<'a, anyhow::Result<Option<ScrapeResult>>> {
        Box::pin(async move {
            self.scrape_calls.fetch_add(1, Ordering::SeqCst);
            let _tab = Tab::open(self);
            if self.hang {
                futures::future::pending::<()>().await;
            }
            Ok(self.page_text.as_ref().map(|text| ScrapeResult {
                url: url.to_string(),
                content: PageContent {
                    text: text.clone(),
                    title: Some("Fake".to_string()),
                    html: Some(format!("<body>{text}</body>")),
                },
            }))
        })
    }

    fn shutdown(&self) -> BoxFuture<'_, anyhow::Result<()>> {
        Box::pin(async move {
            self.shutdown_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }
}

/// Stand-in for a browser tab, closed when the scrape future is dropped
struct Tab<'a> {
    backend: &'a FakeBackend,
}

impl<'a> Tab<'a> {
    fn open(backend: &'a FakeBackend) -> Self {
        backend.tabs_opened.fetch_add(1, Ordering::SeqCst);
        Self { backend }
    }
}

impl Drop for Tab<'_> {
    fn drop(&mut self) {
        self.backend.tabs_closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Retry timer that records requested delays and returns immediately
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingTimer {
    delays: Mutex<Vec<Duration>>,
}

#[allow(dead_code)]
impl RecordingTimer {
    pub fn delays_ms(&self) -> Vec<u128> {
        self.delays
            .lock()
            .expect("timer lock")
            .iter()
            .map(Duration::as_millis)
            .collect()
    }
}

impl RetryTimer for RecordingTimer {
    fn sleep(&self, delay: Duration) -> BoxFuture<'static, ()> {
        self.delays.lock().expect("timer lock").push(delay);
        Box::pin(async {})
    }
}

/// Run a manager over `backend` to completion and return its handle
#[allow(dead_code)]
pub async fn settled_handle(
    backend: &Arc<FakeBackend>,
    timer: Arc<RecordingTimer>,
) -> ScraperHandle {
    let manager = ReadinessManager::new(
        ScraperConfig::default(),
        RetryPolicy::default(),
        backend.factory(),
    )
    .with_timer(timer);
    let handle = manager.handle();
    manager.run().await;
    handle
}

/// Handle on a backend that initialized on the first attempt
#[allow(dead_code)]
pub async fn ready_handle(backend: &Arc<FakeBackend>) -> ScraperHandle {
    settled_handle(backend, Arc::new(RecordingTimer::default())).await
}

/// Handle on a manager that was never started
#[allow(dead_code)]
pub fn idle_handle(backend: &Arc<FakeBackend>) -> ScraperHandle {
    ReadinessManager::new(
        ScraperConfig::default(),
        RetryPolicy::default(),
        backend.factory(),
    )
    .handle()
}

/// Text of the single content item of a tool result
#[allow(dead_code)]
pub fn envelope_text(result: &m::CallToolResult) -> String {
    result
        .content
        .first()
        .and_then(|c| c.as_text())
        .map(|t| t.text.clone())
        .unwrap_or_default()
}

#[allow(dead_code)]
pub fn args(value: serde_json::Value) -> Option<m::JsonObject> {
    value.as_object().cloned()
}
