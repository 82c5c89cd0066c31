//! Configuration module for the SearXNG tool server
//!
//! This module provides `ServerConfig` (loaded from the environment at
//! startup), the fixed `ScraperConfig` for the browser backend and the
//! `RetryPolicy` driving backend initialization.

// Sub-modules
pub mod env;
pub mod types;

// Re-exports for public API
pub use types::{ConfigError, RetryPolicy, ScraperConfig, ServerConfig, parse_searxng_url};
