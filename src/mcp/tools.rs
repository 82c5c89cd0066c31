//! Static descriptors for the advertised tools

use rmcp::model as m;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};

use crate::web_search::SearchQuery;

/// Name of the SearXNG search tool
pub const WEB_SEARCH: &str = "web_search";

/// Name of the page content tool
pub const GET_URL_CONTENT: &str = "get_url_content";

/// Arguments of `get_url_content`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReadUrlArgs {
    /// URL of the page to read
    pub url: String,
}

fn input_schema<T: JsonSchema>() -> Arc<m::JsonObject> {
    let schema = serde_json::to_value(schemars::schema_for!(T)).unwrap_or_default();
    Arc::new(schema.as_object().cloned().unwrap_or_default())
}

fn annotations() -> m::ToolAnnotations {
    m::ToolAnnotations::new()
        .read_only(true)
        .destructive(false)
        .open_world(true)
}

/// Descriptor of `web_search`
pub static WEB_SEARCH_TOOL: LazyLock<m::Tool> = LazyLock::new(|| {
    m::Tool::new(
        WEB_SEARCH,
        "Performs a web search using the SearXNG API, ideal for general queries, news, \
         articles, and online content. Use this for broad information gathering, recent \
         events, or when you need diverse web sources.\n\n\
         Returns one block per hit with its title, description and URL. Supports \
         pagination (pageno), result count, time range (day, month, year), language \
         filtering and safe search (\"0\", \"1\", \"2\").",
        input_schema::<SearchQuery>(),
    )
    .annotate(annotations())
});

/// Descriptor of `get_url_content`
pub static READ_URL_TOOL: LazyLock<m::Tool> = LazyLock::new(|| {
    m::Tool::new(
        GET_URL_CONTENT,
        "Get the content of a URL. Use this for further information retrieving to \
         understand the content of each URL.\n\n\
         The page is rendered in a headless browser and its visible text is returned. \
         Available once the browser has finished starting.",
        input_schema::<ReadUrlArgs>(),
    )
    .annotate(annotations())
});
