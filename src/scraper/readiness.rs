//! Background initialization of the scraping backend
//!
//! State lives in a `tokio::sync::watch` channel. The [`ReadinessManager`]
//! owns the only sender, so it is the only writer; [`ScraperHandle`]s hold
//! receivers and read the latest state without blocking. All transitions run
//! on the manager's single background task, one attempt after another.

use futures::FutureExt;
use futures::future::BoxFuture;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::{BackendFactory, ScrapeBackend};
use crate::config::{RetryPolicy, ScraperConfig};
use crate::error::ToolError;

/// Lifecycle phase of the scraping backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScraperPhase {
    #[default]
    Uninitialized,
    Initializing,
    Ready,
    Failed,
}

impl ScraperPhase {
    /// `Ready` and `Failed` are never left again
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, ScraperPhase::Ready | ScraperPhase::Failed)
    }
}

/// Snapshot of the process-wide scraper state
///
/// **INVARIANT:** `backend` is `Some` exactly when `phase` is `Ready`.
#[derive(Clone, Default)]
pub struct ScraperState {
    phase: ScraperPhase,
    retry_count: u32,
    backend: Option<Arc<dyn ScrapeBackend>>,
}

impl ScraperState {
    fn initializing(retry_count: u32) -> Self {
        Self {
            phase: ScraperPhase::Initializing,
            retry_count,
            backend: None,
        }
    }

    fn ready(backend: Arc<dyn ScrapeBackend>, retry_count: u32) -> Self {
        Self {
            phase: ScraperPhase::Ready,
            retry_count,
            backend: Some(backend),
        }
    }

    fn failed(retry_count: u32) -> Self {
        Self {
            phase: ScraperPhase::Failed,
            retry_count,
            backend: None,
        }
    }

    #[must_use]
    pub fn phase(&self) -> ScraperPhase {
        self.phase
    }

    #[must_use]
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.phase == ScraperPhase::Ready
    }
}

impl fmt::Debug for ScraperState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScraperState")
            .field("phase", &self.phase)
            .field("retry_count", &self.retry_count)
            .field("has_backend", &self.backend.is_some())
            .finish()
    }
}

/// Read-only view of the scraper state
#[derive(Clone)]
pub struct ScraperHandle {
    state: watch::Receiver<ScraperState>,
}

impl ScraperHandle {
    /// Readiness flag: true once init succeeded
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state.borrow().is_ready()
    }

    #[must_use]
    pub fn phase(&self) -> ScraperPhase {
        self.state.borrow().phase
    }

    #[must_use]
    pub fn retry_count(&self) -> u32 {
        self.state.borrow().retry_count
    }

    #[must_use]
    pub fn snapshot(&self) -> ScraperState {
        self.state.borrow().clone()
    }

    /// The live backend, only while ready
    #[must_use]
    pub fn backend(&self) -> Option<Arc<dyn ScrapeBackend>> {
        self.state.borrow().backend.clone()
    }

    /// Wait until initialization reached `Ready` or `Failed`
    ///
    /// Not used on the request path. If the manager goes away first the last
    /// observed phase is returned.
    pub async fn settled(&mut self) -> ScraperPhase {
        let settled = self
            .state
            .wait_for(|state| state.phase.is_terminal())
            .await
            .map(|state| state.phase);
        settled.unwrap_or_else(|_| self.state.borrow().phase)
    }
}

impl fmt::Debug for ScraperHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ScraperHandle")
            .field(&*self.state.borrow())
            .finish()
    }
}

/// Sleeps between initialization attempts
///
/// Abstracted so tests can record the requested delays instead of waiting.
pub trait RetryTimer: Send + Sync {
    fn sleep(&self, delay: Duration) -> BoxFuture<'static, ()>;
}

/// Real-time timer backed by `tokio::time::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

impl RetryTimer for TokioTimer {
    fn sleep(&self, delay: Duration) -> BoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(delay))
    }
}

/// Outcome of a single initialization attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Backend is up and published
    Ready,
    /// Attempt failed; try again after `delay` with the given retry count
    Retry { delay: Duration, retry_count: u32 },
    /// Attempt failed and the budget is spent
    Failed,
}

/// Sole owner and writer of the scraper state
pub struct ReadinessManager {
    config: ScraperConfig,
    policy: RetryPolicy,
    factory: BackendFactory,
    timer: Arc<dyn RetryTimer>,
    state: watch::Sender<ScraperState>,
}

impl ReadinessManager {
    /// Create a manager in the `Uninitialized` phase
    ///
    /// Nothing is constructed until [`run`](Self::run) or
    /// [`spawn`](Self::spawn) is called.
    #[must_use]
    pub fn new(config: ScraperConfig, policy: RetryPolicy, factory: BackendFactory) -> Self {
        let (state, _) = watch::channel(ScraperState::default());
        Self {
            config,
            policy,
            factory,
            timer: Arc::new(TokioTimer),
            state,
        }
    }

    /// Replace the retry timer
    #[must_use]
    pub fn with_timer(mut self, timer: Arc<dyn RetryTimer>) -> Self {
        self.timer = timer;
        self
    }

    /// A new read-only handle on the state
    #[must_use]
    pub fn handle(&self) -> ScraperHandle {
        ScraperHandle {
            state: self.state.subscribe(),
        }
    }

    /// Move the manager onto a detached background task
    pub fn spawn(self) -> (ScraperHandle, JoinHandle<()>) {
        let handle = self.handle();
        let task = tokio::spawn(self.run());
        (handle, task)
    }

    /// Drive initialization until the backend is ready or permanently failed
    pub async fn run(self) {
        let mut retry_count = 0;
        loop {
            match self.attempt(retry_count).await {
                Transition::Ready | Transition::Failed => return,
                Transition::Retry {
                    delay,
                    retry_count: next,
                } => {
                    info!(
                        "Retrying browser initialization in {}ms (retry {}/{})",
                        delay.as_millis(),
                        next,
                        self.policy.max_retries().saturating_sub(1)
                    );
                    self.timer.sleep(delay).await;
                    retry_count = next;
                }
            }
        }
    }

    /// Run one initialization attempt and publish the resulting state
    ///
    /// `retry_count` is the number of attempts that already failed.
    pub async fn attempt(&self, retry_count: u32) -> Transition {
        self.state
            .send_replace(ScraperState::initializing(retry_count));
        info!(
            "Initializing browser (attempt {}/{})",
            retry_count + 1,
            self.policy.max_retries()
        );

        let backend = (self.factory)(&self.config);
        let outcome = AssertUnwindSafe(backend.init()).catch_unwind().await;

        let err = match outcome {
            Ok(Ok(())) => {
                info!("Browser initialized successfully");
                self.state
                    .send_replace(ScraperState::ready(backend, retry_count));
                return Transition::Ready;
            }
            Ok(Err(e)) => ToolError::Init(format!("{e:#}")),
            Err(_) => ToolError::Init("initialization panicked".to_string()),
        };

        // Best-effort cleanup of the half-started instance
        if let Err(e) = backend.shutdown().await {
            warn!("Failed to clean up browser after init failure: {}", e);
        }
        drop(backend);

        match self.policy.retry_delay(retry_count) {
            Some(delay) => {
                warn!("{}", err);
                Transition::Retry {
                    delay,
                    retry_count: retry_count + 1,
                }
            }
            None => {
                error!(
                    "{}. Giving up after {} attempts; get_url_content is disabled for this process",
                    err,
                    retry_count + 1
                );
                self.state.send_replace(ScraperState::failed(retry_count));
                Transition::Failed
            }
        }
    }
}
