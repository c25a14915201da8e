//! Proxy server behavior seen from an HTTP client.

use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::stub_provider::{StubBehavior, StubProvider, closed_url, spawn_proxy};

async fn fetch(url: &str) -> (StatusCode, Value) {
    let response = reqwest::get(url).await.unwrap();
    let status = StatusCode::from_u16(response.status().as_u16()).unwrap();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn test_search_is_relayed_with_server_credential() {
    let upstream = StubProvider::spawn(StubBehavior::Catalog).await;
    let proxy = spawn_proxy(&upstream, Some("server-token")).await;

    let (status, body) = fetch(&format!("{proxy}/api/movies?query=blade%20runner")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"][0]["title"], "blade runner");
    assert_eq!(body["page"], 1);

    let relayed = &upstream.requests()[0];
    assert_eq!(relayed.path, "/3/search/movie");
    assert_eq!(relayed.query.as_deref(), Some("blade runner"));
    assert_eq!(relayed.authorization.as_deref(), Some("Bearer server-token"));
    assert_eq!(relayed.accept.as_deref(), Some("application/json"));
}

#[tokio::test]
async fn test_missing_and_empty_query_use_discover_listing() {
    let upstream = StubProvider::spawn(StubBehavior::Catalog).await;
    let proxy = spawn_proxy(&upstream, Some("server-token")).await;

    let (_, without_query) = fetch(&format!("{proxy}/movies")).await;
    let (_, empty_query) = fetch(&format!("{proxy}/movies?query=")).await;

    assert_eq!(without_query, empty_query);
    assert_eq!(without_query["results"][0]["title"], "Popular One");
    assert!(
        upstream
            .requests()
            .iter()
            .all(|request| request.path == "/3/discover/movie")
    );
}

#[tokio::test]
async fn test_upstream_error_becomes_bad_gateway() {
    let upstream = StubProvider::spawn(StubBehavior::Status(StatusCode::INTERNAL_SERVER_ERROR)).await;
    let proxy = spawn_proxy(&upstream, Some("server-token")).await;

    let (status, body) = fetch(&format!("{proxy}/movies?query=heat")).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, json!({ "error": "Failed to fetch movies" }));
}

#[tokio::test]
async fn test_unreachable_upstream_becomes_bad_gateway() {
    let upstream_url = format!("{}/3", closed_url().await);
    let relay = browsflix_web::UpstreamRelay::with_http_client(
        upstream_url,
        Some("server-token".to_string()),
        reqwest::Client::new(),
    );
    let app = browsflix_web::router(browsflix_web::ProxyState::new(relay));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await });

    let (status, body) = fetch(&format!("http://{addr}/movies")).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Failed to fetch movies");
}

#[tokio::test]
async fn test_missing_credential_is_reported() {
    let upstream = StubProvider::spawn(StubBehavior::Catalog).await;
    let proxy = spawn_proxy(&upstream, None).await;

    let (status, body) = fetch(&format!("{proxy}/movies")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Upstream credential not configured" }));
    assert!(upstream.requests().is_empty());
}

#[tokio::test]
async fn test_health_and_cors() {
    let upstream = StubProvider::spawn(StubBehavior::Catalog).await;
    let proxy = spawn_proxy(&upstream, Some("server-token")).await;

    let response = reqwest::Client::new()
        .get(format!("{proxy}/health"))
        .header("Origin", "http://localhost:5173")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|value| value.to_str().ok()),
        Some("*")
    );
    assert_eq!(response.json::<Value>().await.unwrap(), json!({ "status": "ok" }));
}
