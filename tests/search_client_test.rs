use kodegen_tools_searxng::{SafeSearch, SearchClient, SearchQuery, TimeRange, ToolError};
use mockito::{Matcher, Server};
use serde_json::json;
use url::Url;

fn client_for(server: &Server) -> SearchClient {
    SearchClient::new(Url::parse(&server.url()).expect("mock server url"))
}

#[tokio::test]
async fn test_single_hit_digest() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), "rust async".into()),
            Matcher::UrlEncoded("format".into(), "json".into()),
            Matcher::UrlEncoded("pageno".into(), "1".into()),
            Matcher::UrlEncoded("count".into(), "10".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"results": [{"title": "A", "content": "B", "url": "C"}]}).to_string())
        .create_async()
        .await;

    let digest = client_for(&server)
        .search(&SearchQuery::new("rust async"))
        .await
        .expect("search");

    assert_eq!(digest, "Title: A\nDescription: B\nURL: C");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_optional_filters_forwarded() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), "news".into()),
            Matcher::UrlEncoded("pageno".into(), "3".into()),
            Matcher::UrlEncoded("count".into(), "5".into()),
            Matcher::UrlEncoded("time_range".into(), "month".into()),
            Matcher::UrlEncoded("language".into(), "fr".into()),
            Matcher::UrlEncoded("safesearch".into(), "2".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"results": []}"#)
        .create_async()
        .await;

    let query = SearchQuery::new("news")
        .with_pageno(3)
        .with_count(5)
        .with_time_range(TimeRange::Month)
        .with_language("fr")
        .with_safesearch(SafeSearch::Strict);
    let digest = client_for(&server).search(&query).await.expect("search");

    assert_eq!(digest, "");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_missing_results_field_is_empty() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/search")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"query": "x", "number_of_results": 0}"#)
        .create_async()
        .await;

    let digest = client_for(&server)
        .search(&SearchQuery::new("x"))
        .await
        .expect("search");
    assert_eq!(digest, "");
}

#[tokio::test]
async fn test_partial_hits_default_to_empty_fields() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/search")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(json!({"results": [{"url": "https://a.example"}]}).to_string())
        .create_async()
        .await;

    let results = client_for(&server)
        .search_results(&SearchQuery::new("x"))
        .await
        .expect("search");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "");
    assert_eq!(results[0].content, "");
    assert_eq!(results[0].url, "https://a.example");
}

#[tokio::test]
async fn test_upstream_500_is_upstream_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/search")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("engine exploded")
        .create_async()
        .await;

    let err = client_for(&server)
        .search(&SearchQuery::new("x"))
        .await
        .expect_err("upstream failure");

    assert_eq!(err.status(), Some(500));
    assert!(matches!(err, ToolError::Upstream { .. }));
    assert_eq!(
        err.to_string(),
        "SearXNG API error: 500 Internal Server Error - engine exploded"
    );
}

#[tokio::test]
async fn test_base_path_prefix_is_kept() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/searx/search")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"results": []}"#)
        .create_async()
        .await;

    let base = Url::parse(&format!("{}/searx/", server.url())).expect("url");
    let client = SearchClient::new(base.clone());
    assert_eq!(client.base_url(), &base);
    client
        .search(&SearchQuery::new("x"))
        .await
        .expect("search");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unreachable_instance_is_http_error() {
    // nothing listens on port 9 (discard) in the test environment
    let client = SearchClient::new(Url::parse("http://127.0.0.1:9").expect("url"));
    let err = client
        .search(&SearchQuery::new("x"))
        .await
        .expect_err("connection refused");
    assert!(matches!(err, ToolError::Http(_)));
    assert!(err.is_transient());
}
