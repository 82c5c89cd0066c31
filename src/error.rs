//! Error types shared by the search and fetch tools
//!
//! Every variant is recoverable at the tool boundary: the dispatcher renders
//! it into an `isError: true` envelope. Only [`ToolError::Init`] is produced
//! outside a tool call, by the scraper readiness manager.

use thiserror::Error;

use crate::utils::constants::NOT_READY_MESSAGE;

/// Result type alias for tool operations
pub type ToolResult<T> = Result<T, ToolError>;

/// Error types for tool operations
#[derive(Debug, Error)]
pub enum ToolError {
    /// Tool arguments were missing or malformed
    #[error("{0}")]
    InvalidArguments(String),

    /// SearXNG answered with a non-success HTTP status
    #[error("SearXNG API error: {status} {status_text} - {body}")]
    Upstream {
        status: u16,
        status_text: String,
        body: String,
    },

    /// A page fetch was requested before the browser finished initializing
    #[error("{}", NOT_READY_MESSAGE)]
    NotReady,

    /// The scraping backend produced no content for a URL
    #[error("{0}")]
    Fetch(String),

    /// Scraping backend construction or initialization failed
    #[error("Failed to initialize browser: {0}")]
    Init(String),

    /// Transport-level HTTP failure (connection, decoding)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Other errors
    #[error("{0}")]
    Internal(String),
}

impl From<anyhow::Error> for ToolError {
    fn from(error: anyhow::Error) -> Self {
        ToolError::Internal(format!("{error:#}"))
    }
}

impl ToolError {
    /// Whether the caller can reasonably retry the same call later
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, ToolError::NotReady | ToolError::Http(_))
    }

    /// HTTP status carried by an upstream failure
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            ToolError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}
