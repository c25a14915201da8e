//! Primary/fallback resolution over real HTTP.
//!
//! The primary is either the real proxy or a stub playing a broken proxy;
//! the fallback is always a stub provider so its traffic can be counted.

use std::time::Duration;

use axum::http::StatusCode;
use browsflix_core::config::CatalogConfig;
use browsflix_search::{ApiOutcome, CatalogError, CatalogTarget, FetchStrategy};

use crate::stub_provider::{NOT_FOUND_QUERY, StubBehavior, StubProvider, closed_url, spawn_proxy};

const CLIENT_TOKEN: &str = "client-token";
const SERVER_TOKEN: &str = "server-token";

fn catalog_config(proxy_base_url: String, provider: &StubProvider) -> CatalogConfig {
    CatalogConfig {
        proxy_base_url,
        provider_base_url: provider.api_url(),
        bearer_token: Some(CLIENT_TOKEN.to_string()),
        request_timeout: Some(Duration::from_secs(5)),
        ..Default::default()
    }
}

fn titles(outcome: &ApiOutcome) -> Vec<String> {
    outcome
        .results()
        .unwrap_or_default()
        .iter()
        .map(|movie| movie.title.clone())
        .collect()
}

#[tokio::test]
async fn test_healthy_proxy_answers_without_fallback() {
    let upstream = StubProvider::spawn(StubBehavior::Catalog).await;
    let fallback = StubProvider::spawn(StubBehavior::Catalog).await;
    let proxy_url = spawn_proxy(&upstream, Some(SERVER_TOKEN)).await;

    let strategy = FetchStrategy::from_config(&catalog_config(proxy_url, &fallback)).unwrap();
    let outcome = strategy.resolve("the matrix").await;

    assert_eq!(titles(&outcome), vec!["the matrix"]);
    assert!(fallback.requests().is_empty());

    let relayed = upstream.requests();
    assert_eq!(relayed.len(), 1);
    assert_eq!(relayed[0].path, "/3/search/movie");
    assert_eq!(relayed[0].query.as_deref(), Some("the matrix"));
    assert_eq!(
        relayed[0].authorization.as_deref(),
        Some("Bearer server-token")
    );
}

#[tokio::test]
async fn test_unreachable_proxy_falls_back_with_credentials() {
    let fallback = StubProvider::spawn(StubBehavior::Catalog).await;

    let strategy =
        FetchStrategy::from_config(&catalog_config(closed_url().await, &fallback)).unwrap();
    let outcome = strategy.resolve("heat").await;

    assert_eq!(titles(&outcome), vec!["heat"]);

    let requests = fallback.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/3/search/movie");
    assert_eq!(requests[0].authorization.as_deref(), Some("Bearer client-token"));
    assert_eq!(requests[0].accept.as_deref(), Some("application/json"));
}

#[tokio::test]
async fn test_empty_query_falls_back_to_discover_listing() {
    let fallback = StubProvider::spawn(StubBehavior::Catalog).await;

    let strategy =
        FetchStrategy::from_config(&catalog_config(closed_url().await, &fallback)).unwrap();
    let outcome = strategy.resolve("").await;

    assert_eq!(titles(&outcome), vec!["Popular One", "Popular Two"]);
    assert_eq!(fallback.requests()[0].path, "/3/discover/movie");
}

#[tokio::test]
async fn test_proxy_gateway_error_triggers_fallback() {
    let broken_proxy = StubProvider::spawn(StubBehavior::Status(StatusCode::BAD_GATEWAY)).await;
    let fallback = StubProvider::spawn(StubBehavior::Catalog).await;

    let strategy =
        FetchStrategy::from_config(&catalog_config(broken_proxy.root_url(), &fallback)).unwrap();
    let outcome = strategy.resolve("alien").await;

    assert_eq!(titles(&outcome), vec!["alien"]);
    assert_eq!(broken_proxy.requests()[0].path, "/movies");
    assert_eq!(broken_proxy.requests()[0].authorization, None);
    assert_eq!(fallback.queries(), vec!["alien"]);
}

#[tokio::test]
async fn test_unparseable_proxy_body_triggers_fallback() {
    let broken_proxy = StubProvider::spawn(StubBehavior::Garbage).await;
    let fallback = StubProvider::spawn(StubBehavior::Catalog).await;

    let strategy =
        FetchStrategy::from_config(&catalog_config(broken_proxy.root_url(), &fallback)).unwrap();
    let outcome = strategy.resolve("alien").await;

    assert_eq!(titles(&outcome), vec!["alien"]);
    assert_eq!(fallback.requests().len(), 1);
}

#[tokio::test]
async fn test_api_error_from_proxy_is_final() {
    let upstream = StubProvider::spawn(StubBehavior::Catalog).await;
    let fallback = StubProvider::spawn(StubBehavior::Catalog).await;
    let proxy_url = spawn_proxy(&upstream, Some(SERVER_TOKEN)).await;

    let strategy = FetchStrategy::from_config(&catalog_config(proxy_url, &fallback)).unwrap();
    let outcome = strategy.resolve(NOT_FOUND_QUERY).await;

    assert_eq!(outcome, ApiOutcome::ApiError("Movie not found!".to_string()));
    assert!(fallback.requests().is_empty());
}

#[tokio::test]
async fn test_both_targets_failing_reports_fallback_cause() {
    let fallback = StubProvider::spawn(StubBehavior::Status(StatusCode::UNAUTHORIZED)).await;

    let strategy =
        FetchStrategy::from_config(&catalog_config(closed_url().await, &fallback)).unwrap();
    let outcome = strategy.resolve("heat").await;

    assert_eq!(
        outcome,
        ApiOutcome::TransportFailure(CatalogError::HttpStatus {
            target: CatalogTarget::Fallback,
            status: 401,
        })
    );
}
