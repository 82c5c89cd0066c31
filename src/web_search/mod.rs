//! Web search through a SearXNG instance
//!
//! The query builder turns a [`SearchQuery`] into a `/search?format=json`
//! URL and the [`SearchClient`] runs it, returning either the normalized
//! hits or the text digest used by the `web_search` tool.

mod client;
mod query;
mod types;

// Re-export public types
pub use client::{SearchClient, parse_results, render_digest};
pub use query::build_search_url;
pub use types::{SafeSearch, SearchQuery, SearchResult, TimeRange};
