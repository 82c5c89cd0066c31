//! rmcp `ServerHandler` exposing the dispatcher over MCP

use rmcp::model as m;
use rmcp::service::RequestContext;
use rmcp::{RoleServer, ServerHandler};

use super::dispatcher::ToolDispatcher;

const INSTRUCTIONS: &str = "Use web_search to query the configured SearXNG instance and \
get_url_content to read the text of a page. get_url_content becomes available once the \
headless browser has started.";

/// MCP server for the SearXNG search and page content tools
#[derive(Clone)]
pub struct SearxngServer {
    dispatcher: ToolDispatcher,
}

impl SearxngServer {
    #[must_use]
    pub fn new(dispatcher: ToolDispatcher) -> Self {
        Self { dispatcher }
    }

    #[must_use]
    pub fn dispatcher(&self) -> &ToolDispatcher {
        &self.dispatcher
    }
}

#[allow(clippy::manual_async_fn)]
impl ServerHandler for SearxngServer {
    fn get_info(&self) -> m::ServerInfo {
        m::ServerInfo {
            capabilities: m::ServerCapabilities::builder().enable_tools().build(),
            server_info: m::Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(INSTRUCTIONS.to_string()),
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _req: Option<m::PaginatedRequestParam>,
        _ctx: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<m::ListToolsResult, m::ErrorData>> + Send + '_
    {
        async move { Ok(m::ListToolsResult::with_all_items(self.dispatcher.list_tools())) }
    }

    fn call_tool(
        &self,
        req: m::CallToolRequestParam,
        _ctx: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<m::CallToolResult, m::ErrorData>> + Send + '_
    {
        async move {
            Ok(self
                .dispatcher
                .call_tool(&req.name, req.arguments)
                .await)
        }
    }
}
