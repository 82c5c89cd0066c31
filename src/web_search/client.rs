//! SearXNG HTTP client
//!
//! Issues the search request, normalizes the JSON payload into
//! [`SearchResult`]s and renders the plain-text digest handed back to the
//! agent.

use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::query::build_search_url;
use super::types::{SearchQuery, SearchResult};
use crate::error::{ToolError, ToolResult};

/// Client for a single SearXNG instance
#[derive(Debug, Clone)]
pub struct SearchClient {
    http: reqwest::Client,
    base_url: Url,
}

impl SearchClient {
    /// Create a client with a default HTTP stack
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self::with_http(reqwest::Client::new(), base_url)
    }

    /// Create a client sharing an existing `reqwest::Client`
    #[must_use]
    pub fn with_http(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Run a search and return the normalized hits in backend order
    pub async fn search_results(&self, query: &SearchQuery) -> ToolResult<Vec<SearchResult>> {
        let url = build_search_url(&self.base_url, query);
        debug!("Querying SearXNG: {}", url);

        let response = self.http.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("SearXNG returned {} for query '{}'", status, query.query);
            return Err(ToolError::Upstream {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                body,
            });
        }

        let payload: Value = response.json().await?;
        let results = parse_results(&payload);
        debug!("SearXNG returned {} results", results.len());
        Ok(results)
    }

    /// Run a search and render the text digest
    ///
    /// An empty result set renders as an empty string.
    pub async fn search(&self, query: &SearchQuery) -> ToolResult<String> {
        let results = self.search_results(query).await?;
        Ok(render_digest(&results))
    }
}

/// Extract hits from a SearXNG JSON payload
///
/// A missing or non-array `results` field yields no hits.
#[must_use]
pub fn parse_results(payload: &Value) -> Vec<SearchResult> {
    payload
        .get("results")
        .and_then(Value::as_array)
        .map(|hits| hits.iter().map(SearchResult::from_raw).collect())
        .unwrap_or_default()
}

/// Join result blocks with a blank line between them
#[must_use]
pub fn render_digest(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(SearchResult::to_block)
        .collect::<Vec<_>>()
        .join("\n\n")
}
