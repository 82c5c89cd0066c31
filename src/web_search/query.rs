//! SearXNG search URL construction

use url::Url;

use super::types::SearchQuery;

/// Build the SearXNG `/search` URL for a query
///
/// Always sets `q`, `format=json`, `pageno` and `count`. `time_range` and
/// `safesearch` are only present when they hold a recognized value, and
/// `language` is omitted when empty or `"all"`.
///
/// The base URL keeps its own path, so an instance mounted under a prefix
/// (`https://host/searx`) resolves to `https://host/searx/search`.
#[must_use]
pub fn build_search_url(base_url: &Url, query: &SearchQuery) -> Url {
    let mut url = base_url.clone();
    let path = format!("{}/search", base_url.path().trim_end_matches('/'));
    url.set_path(&path);
    url.set_query(None);
    url.set_fragment(None);

    {
        let mut pairs = url.query_pairs_mut();
        pairs
            .append_pair("q", &query.query)
            .append_pair("format", "json")
            .append_pair("pageno", &query.pageno.to_string())
            .append_pair("count", &query.count.to_string());

        if let Some(time_range) = query.time_range {
            pairs.append_pair("time_range", time_range.as_str());
        }
        if let Some(language) = query.language_filter() {
            pairs.append_pair("language", language);
        }
        if let Some(safesearch) = query.safesearch {
            pairs.append_pair("safesearch", safesearch.as_str());
        }
    }

    url
}
