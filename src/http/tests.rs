//! Tests for the HTTP module

use super::*;
use crate::error::Error;
use crate::types::{query_params, ParamValue, QueryParams};
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn test_http_fetcher_config_default() {
    let config = HttpFetcherConfig::default();
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert!(config.default_headers.is_empty());
    assert!(config.user_agent.starts_with("pagepoll/"));
}

#[test]
fn test_http_fetcher_config_builder() {
    let config = HttpFetcherConfig::builder()
        .timeout(Duration::from_secs(5))
        .header("X-Api-Key", "secret")
        .user_agent("test-agent/1.0")
        .build();

    assert_eq!(config.timeout, Duration::from_secs(5));
    assert_eq!(
        config.default_headers.get("X-Api-Key"),
        Some(&"secret".to_string())
    );
    assert_eq!(config.user_agent, "test-agent/1.0");
}

#[tokio::test]
async fn test_fetch_sends_params_as_query_string() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "rust"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[1,2,3]"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new().unwrap();
    let params = query_params([("q", ParamValue::from("rust")), ("page", ParamValue::from(3))]);
    let body = fetcher
        .fetch(&format!("{}/search", mock_server.uri()), &params)
        .await
        .unwrap();

    assert_eq!(&body[..], b"[1,2,3]");
}

#[tokio::test]
async fn test_fetch_params_are_not_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("page", "1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new().unwrap();
    let params = query_params([("page", 1)]);
    let body = fetcher.fetch(&mock_server.uri(), &params).await.unwrap();
    assert_eq!(&body[..], b"ok");
}

#[tokio::test]
async fn test_fetch_default_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("X-Api-Key", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = HttpFetcherConfig::builder().header("X-Api-Key", "secret").build();
    let fetcher = HttpFetcher::with_config(config).unwrap();
    let body = fetcher
        .fetch(&mock_server.uri(), &QueryParams::new())
        .await
        .unwrap();
    assert_eq!(&body[..], b"{}");
}

#[tokio::test]
async fn test_fetch_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new().unwrap();
    let err = fetcher
        .fetch(&mock_server.uri(), &QueryParams::new())
        .await
        .unwrap_err();

    assert!(err.is_transport());
    match err {
        Error::HttpStatus { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_connection_refused() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let uri = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let fetcher = HttpFetcher::with_config(
        HttpFetcherConfig::builder()
            .timeout(Duration::from_secs(2))
            .build(),
    )
    .unwrap();
    let err = fetcher.fetch(&uri, &QueryParams::new()).await.unwrap_err();

    assert!(matches!(err, Error::Http(_)));
    assert!(err.is_transport());
}

#[test]
fn test_invalid_header_rejected_at_construction() {
    let config = HttpFetcherConfig::builder().header("bad header", "x").build();
    assert!(matches!(config.header_map(), Err(Error::Config { .. })));

    let err = HttpFetcher::with_config(config).unwrap_err();
    assert!(err.is_config());
    assert!(!err.is_transport());
}

#[test]
fn test_header_map_converts_default_headers() {
    let config = HttpFetcherConfig::builder()
        .header("X-Api-Key", "secret")
        .header("Accept", "application/json")
        .build();

    let headers = config.header_map().unwrap();
    assert_eq!(headers.len(), 2);
    assert_eq!(headers["x-api-key"], "secret");
}
