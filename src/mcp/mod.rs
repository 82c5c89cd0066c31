//! MCP surface: two tools over stdio
//!
//! - `web_search`: query SearXNG and return a text digest of the hits
//! - `get_url_content`: render a page in the shared headless browser and return its text
//!
//! [`ToolDispatcher`] holds the routing and error normalization and can be
//! driven directly in tests; [`SearxngServer`] adapts it to rmcp.

pub mod dispatcher;
pub mod server;
pub mod tools;

pub use dispatcher::ToolDispatcher;
pub use server::SearxngServer;
pub use tools::{GET_URL_CONTENT, READ_URL_TOOL, ReadUrlArgs, WEB_SEARCH, WEB_SEARCH_TOOL};
