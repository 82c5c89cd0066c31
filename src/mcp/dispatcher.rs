//! Routes tool calls and normalizes every outcome into a tool result
//!
//! Callers only ever see a [`m::CallToolResult`] with a single text item.
//! Failures of any kind, panics included, come back as `isError: true` with
//! the text `Error: <message>`.

use futures::FutureExt;
use rmcp::model as m;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::panic::AssertUnwindSafe;
use tracing::{debug, error, warn};

use super::tools::{GET_URL_CONTENT, READ_URL_TOOL, ReadUrlArgs, WEB_SEARCH, WEB_SEARCH_TOOL};
use crate::error::{ToolError, ToolResult};
use crate::scraper::{ContentFetcher, ScraperHandle};
use crate::utils::constants::TOOL_NOT_READY_MESSAGE;
use crate::web_search::{SearchClient, SearchQuery};

/// Outcome of routing a call, before normalization
enum Reply {
    Text(String),
    Failure(String),
}

/// Handles `tools/list` and `tools/call` for both tools
#[derive(Clone)]
pub struct ToolDispatcher {
    search: SearchClient,
    fetcher: ContentFetcher,
    scraper: ScraperHandle,
}

impl ToolDispatcher {
    #[must_use]
    pub fn new(search: SearchClient, fetcher: ContentFetcher, scraper: ScraperHandle) -> Self {
        Self {
            search,
            fetcher,
            scraper,
        }
    }

    /// The two advertised tools, always in the same order
    #[must_use]
    pub fn list_tools(&self) -> Vec<m::Tool> {
        vec![WEB_SEARCH_TOOL.clone(), READ_URL_TOOL.clone()]
    }

    /// Run a tool call; never fails and never panics past this point
    pub async fn call_tool(&self, name: &str, arguments: Option<m::JsonObject>) -> m::CallToolResult {
        let routed = AssertUnwindSafe(self.route(name, arguments))
            .catch_unwind()
            .await;

        match routed {
            Ok(Ok(reply)) => into_envelope(reply),
            Ok(Err(e)) => {
                warn!("Tool {} failed: {}", name, e);
                error_envelope(&e.to_string())
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!("Tool {} panicked: {}", name, message);
                error_envelope(&message)
            }
        }
    }

    async fn route(&self, name: &str, arguments: Option<m::JsonObject>) -> ToolResult<Reply> {
        let arguments = arguments
            .ok_or_else(|| ToolError::InvalidArguments("No arguments provided".to_string()))?;

        match name {
            WEB_SEARCH => {
                let query: SearchQuery = parse_arguments(arguments)?;
                debug!("web_search: {:?}", query);
                let digest = self.search.search(&query).await?;
                Ok(Reply::Text(digest))
            }
            GET_URL_CONTENT => {
                if !self.scraper.is_ready() {
                    return Ok(Reply::Failure(TOOL_NOT_READY_MESSAGE.to_string()));
                }
                let args: ReadUrlArgs = parse_arguments(arguments)?;
                let text = self.fetcher.fetch_content(&args.url).await?;
                Ok(Reply::Text(text))
            }
            other => Ok(Reply::Failure(format!("Unknown tool: {other}"))),
        }
    }
}

fn parse_arguments<T: DeserializeOwned>(arguments: m::JsonObject) -> ToolResult<T> {
    serde_json::from_value(Value::Object(arguments))
        .map_err(|e| ToolError::InvalidArguments(format!("Invalid arguments: {e}")))
}

fn into_envelope(reply: Reply) -> m::CallToolResult {
    match reply {
        Reply::Text(text) => m::CallToolResult::success(vec![m::Content::text(text)]),
        Reply::Failure(text) => m::CallToolResult::error(vec![m::Content::text(text)]),
    }
}

fn error_envelope(message: &str) -> m::CallToolResult {
    m::CallToolResult::error(vec![m::Content::text(format!("Error: {message}"))])
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "internal error".to_string()
    }
}
