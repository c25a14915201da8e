//! Search sessions driving real HTTP clients.

use std::sync::Arc;
use std::time::Duration;

use browsflix_core::config::CatalogConfig;
use browsflix_core::{
    BrowsflixConfig, InMemoryUsageRecorder, JsonFileUsageRecorder, UsageRecorder,
};
use browsflix_search::{
    FetchStrategy, SearchSessionHandle, SessionError, SessionState, spawn_search_session,
};
use tempfile::TempDir;

use crate::stub_provider::{StubBehavior, StubProvider, closed_url};

const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

struct Fixture {
    session: SearchSessionHandle,
    provider: StubProvider,
    recorder: Arc<JsonFileUsageRecorder>,
    _store_dir: TempDir,
}

/// Session whose proxy is down, so every query lands on the stub provider.
async fn fixture() -> Fixture {
    let provider = StubProvider::spawn(StubBehavior::Catalog).await;
    let store_dir = tempfile::tempdir().unwrap();
    let recorder = Arc::new(JsonFileUsageRecorder::new(store_dir.path().join("searches.json")));
    let session = session_on(&provider, recorder.clone()).await;

    Fixture {
        session,
        provider,
        recorder,
        _store_dir: store_dir,
    }
}

async fn session_on(
    provider: &StubProvider,
    recorder: Arc<dyn UsageRecorder>,
) -> SearchSessionHandle {
    let config = BrowsflixConfig {
        catalog: CatalogConfig {
            proxy_base_url: closed_url().await,
            provider_base_url: provider.api_url(),
            bearer_token: Some("client-token".to_string()),
            request_timeout: Some(SETTLE_TIMEOUT),
            ..Default::default()
        },
        ..BrowsflixConfig::for_testing()
    };

    let strategy = FetchStrategy::from_config(&config.catalog).unwrap();
    spawn_search_session(strategy, recorder, &config.session)
}

async fn settled(session: &SearchSessionHandle, query: &str) -> SessionState {
    tokio::time::timeout(SETTLE_TIMEOUT, session.settled_for(query))
        .await
        .expect("session did not settle in time")
        .unwrap()
}

#[tokio::test]
async fn test_mount_shows_discover_listing() {
    let fx = fixture().await;

    let state = settled(&fx.session, "").await;

    let titles: Vec<&str> = state.results.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, vec!["Popular One", "Popular Two"]);
    assert_eq!(state.error(), None);
}

#[tokio::test]
async fn test_typing_burst_issues_one_search() {
    let fx = fixture().await;
    settled(&fx.session, "").await;

    for raw in ["b", "bl", "bla", "blade"] {
        fx.session.update_query(raw).await.unwrap();
    }
    let state = settled(&fx.session, "blade").await;

    assert_eq!(state.results[0].title, "blade");
    assert_eq!(fx.provider.queries(), vec!["", "blade"]);
}

#[tokio::test]
async fn test_same_query_in_separate_sessions_gives_same_results() {
    let provider = StubProvider::spawn(StubBehavior::Catalog).await;
    let first = session_on(&provider, Arc::new(InMemoryUsageRecorder::new())).await;
    let second = session_on(&provider, Arc::new(InMemoryUsageRecorder::new())).await;

    first.update_query("heat").await.unwrap();
    let first_state = settled(&first, "heat").await;
    second.update_query("heat").await.unwrap();
    let second_state = settled(&second, "heat").await;

    assert!(!first_state.results.is_empty());
    assert_eq!(first_state.results, second_state.results);
    let heat_requests = provider.queries().into_iter().filter(|q| q == "heat").count();
    assert_eq!(heat_requests, 2);
}

#[tokio::test]
async fn test_search_is_recorded_in_json_store() {
    let fx = fixture().await;

    fx.session.update_query("heat").await.unwrap();
    settled(&fx.session, "heat").await;
    fx.session.update_query("ronin").await.unwrap();
    settled(&fx.session, "ronin").await;
    fx.session.update_query("heat").await.unwrap();
    settled(&fx.session, "heat").await;
    fx.session.shutdown().await.unwrap();

    let trending = fx.recorder.trending(10).await.unwrap();
    let terms: Vec<(&str, u64)> = trending
        .iter()
        .map(|record| (record.search_term.as_str(), record.count))
        .collect();
    assert_eq!(terms, vec![("heat", 2), ("ronin", 1)]);
    assert_eq!(trending[0].movie_id, 42);
    assert_eq!(
        trending[0].poster_url.as_deref(),
        Some("https://image.tmdb.org/t/p/w500/poster.jpg")
    );
}

#[tokio::test]
async fn test_discover_listing_is_not_recorded() {
    let fx = fixture().await;

    settled(&fx.session, "").await;
    fx.session.shutdown().await.unwrap();

    assert!(fx.recorder.load().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_handle_after_shutdown() {
    let fx = fixture().await;
    let observer = fx.session.clone();

    fx.session.shutdown().await.unwrap();

    assert_eq!(observer.refresh().await, Err(SessionError::Shutdown));
    assert_eq!(observer.shutdown().await, Err(SessionError::Shutdown));
    assert!(!observer.is_running());
}
