//! Typing through a session backed by the proxy, then by the fallback.

use std::sync::Arc;
use std::time::Duration;

use browsflix_core::config::CatalogConfig;
use browsflix_core::{BrowsflixConfig, InMemoryUsageRecorder};
use browsflix_search::{FetchStrategy, SearchSessionHandle, SessionPhase, spawn_search_session};

use crate::stub_provider::{NOT_FOUND_QUERY, StubBehavior, StubProvider, spawn_proxy};

const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

async fn session_against(
    proxy_url: String,
    provider: &StubProvider,
    recorder: Arc<InMemoryUsageRecorder>,
) -> SearchSessionHandle {
    let config = BrowsflixConfig {
        catalog: CatalogConfig {
            proxy_base_url: proxy_url,
            provider_base_url: provider.api_url(),
            bearer_token: Some("client-token".to_string()),
            request_timeout: Some(SETTLE_TIMEOUT),
            ..Default::default()
        },
        ..BrowsflixConfig::for_testing()
    };
    let strategy = FetchStrategy::from_config(&config.catalog).unwrap();
    let session = spawn_search_session(strategy, recorder, &config.session);

    tokio::time::timeout(SETTLE_TIMEOUT, session.settled_for(""))
        .await
        .expect("discover listing did not load in time")
        .unwrap();
    session
}

async fn search(session: &SearchSessionHandle, query: &str) -> browsflix_search::SessionState {
    session.update_query(query).await.unwrap();
    tokio::time::timeout(SETTLE_TIMEOUT, session.settled_for(query))
        .await
        .expect("session did not settle in time")
        .unwrap()
}

#[tokio::test]
async fn test_search_through_proxy() {
    let upstream = StubProvider::spawn(StubBehavior::Catalog).await;
    let direct = StubProvider::spawn(StubBehavior::Catalog).await;
    let proxy_url = spawn_proxy(&upstream, Some("server-token")).await;
    let recorder = Arc::new(InMemoryUsageRecorder::new());
    let session = session_against(proxy_url, &direct, recorder.clone()).await;

    let state = search(&session, "the thing").await;
    assert_eq!(state.results[0].title, "the thing");
    assert_eq!(state.results[0].year(), Some(1999));

    let state = search(&session, NOT_FOUND_QUERY).await;
    assert_eq!(state.error(), Some("Movie not found!"));
    assert_eq!(state.phase, SessionPhase::Failed);
    assert!(state.results.is_empty());

    session.shutdown().await.unwrap();

    // Every request went through the proxy with the server credential
    assert!(direct.requests().is_empty());
    assert!(
        upstream
            .requests()
            .iter()
            .all(|request| request.authorization.as_deref() == Some("Bearer server-token"))
    );
    assert_eq!(recorder.record("the thing").map(|r| r.count), Some(1));
    assert!(recorder.record(NOT_FOUND_QUERY).is_none());
}

#[tokio::test]
async fn test_misconfigured_proxy_falls_back_to_provider() {
    let upstream = StubProvider::spawn(StubBehavior::Catalog).await;
    let direct = StubProvider::spawn(StubBehavior::Catalog).await;
    // No server credential: the proxy answers 500 for every catalog request
    let proxy_url = spawn_proxy(&upstream, None).await;
    let recorder = Arc::new(InMemoryUsageRecorder::new());
    let session = session_against(proxy_url, &direct, recorder.clone()).await;

    let state = search(&session, "arrival").await;

    assert_eq!(state.results[0].title, "arrival");
    assert_eq!(state.error(), None);
    assert!(upstream.requests().is_empty());
    assert_eq!(direct.queries(), vec!["", "arrival"]);
    assert!(
        direct
            .requests()
            .iter()
            .all(|request| request.authorization.as_deref() == Some("Bearer client-token"))
    );

    session.shutdown().await.unwrap();
    assert_eq!(recorder.record("arrival").map(|r| r.movie_id), Some(42));
}
