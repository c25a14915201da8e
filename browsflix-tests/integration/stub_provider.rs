//! In-process stand-in for the movie provider (or a misbehaving proxy).
//!
//! Binds an ephemeral loopback port, answers every path, and records each
//! request so tests can assert on paths, queries and credentials.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::header::{ACCEPT, AUTHORIZATION};
use axum::http::{HeaderMap, HeaderName, StatusCode, Uri};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::any;
use browsflix_web::{ProxyState, UpstreamRelay};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// Query the catalog behavior answers with an API-level error.
pub const NOT_FOUND_QUERY: &str = "nothing";

/// How the stub answers.
#[derive(Debug, Clone)]
pub enum StubBehavior {
    /// Discover listing for empty queries, one echo result for searches
    Catalog,
    /// Fixed status with a small JSON error body
    Status(StatusCode),
    /// 200 with a non-JSON body
    Garbage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub accept: Option<String>,
}

#[derive(Clone)]
struct StubState {
    behavior: StubBehavior,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

pub struct StubProvider {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubProvider {
    pub async fn spawn(behavior: StubBehavior) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            behavior,
            requests: Arc::clone(&requests),
        };
        let app = Router::new().fallback(any(answer)).with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, requests }
    }

    /// Base URL shaped like the provider API root.
    pub fn api_url(&self) -> String {
        format!("http://{}/3", self.addr)
    }

    /// Base URL shaped like a proxy root.
    pub fn root_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    pub fn queries(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|request| request.query.unwrap_or_default())
            .collect()
    }
}

async fn answer(
    State(stub): State<StubState>,
    uri: Uri,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let header = |name: HeaderName| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    let query = params.get("query").cloned();

    stub.requests.lock().push(RecordedRequest {
        path: uri.path().to_string(),
        query: query.clone(),
        authorization: header(AUTHORIZATION),
        accept: header(ACCEPT),
    });

    match stub.behavior {
        StubBehavior::Catalog => Json(catalog_body(query.as_deref())).into_response(),
        StubBehavior::Status(status) => {
            (status, Json(json!({ "status_message": "stubbed failure" }))).into_response()
        }
        StubBehavior::Garbage => "<html>maintenance</html>".into_response(),
    }
}

fn catalog_body(query: Option<&str>) -> Value {
    match query.filter(|query| !query.is_empty()) {
        Some(NOT_FOUND_QUERY) => json!({ "Response": "False", "Error": "Movie not found!" }),
        Some(query) => json!({
            "page": 1,
            "results": [{
                "id": 42,
                "title": query,
                "release_date": "1999-03-30",
                "poster_path": "/poster.jpg",
                "vote_average": 8.2
            }]
        }),
        None => json!({
            "page": 1,
            "results": [
                { "id": 1, "title": "Popular One" },
                { "id": 2, "title": "Popular Two" }
            ]
        }),
    }
}

/// Runs the real proxy in front of `upstream`; returns its root URL.
pub async fn spawn_proxy(upstream: &StubProvider, credential: Option<&str>) -> String {
    let relay = UpstreamRelay::with_http_client(
        upstream.api_url(),
        credential.map(str::to_string),
        reqwest::Client::new(),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(browsflix_web::serve(listener, ProxyState::new(relay)));

    format!("http://{addr}")
}

/// Loopback URL nothing listens on.
pub async fn closed_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
