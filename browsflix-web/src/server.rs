//! Proxy server wiring.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use browsflix_core::config::{CatalogConfig, ProxyConfig};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::errors::ProxyError;
use crate::handlers::{health, movies};
use crate::relay::UpstreamRelay;

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct ProxyState {
    pub relay: Arc<UpstreamRelay>,
}

impl ProxyState {
    pub fn new(relay: UpstreamRelay) -> Self {
        Self {
            relay: Arc::new(relay),
        }
    }
}

/// Builds the proxy routes.
pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route("/movies", get(movies))
        .route("/api/movies", get(movies))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Proxy bound to its configured address, ready to serve.
#[derive(Debug)]
pub struct ProxyServer {
    listener: TcpListener,
    state: ProxyState,
}

impl ProxyServer {
    /// Builds the upstream relay and binds the configured address.
    ///
    /// # Errors
    ///
    /// - `ProxyError::ClientBuild` - Upstream HTTP client could not be constructed
    /// - `ProxyError::Bind` - Address could not be bound
    pub async fn bind(proxy: &ProxyConfig, catalog: &CatalogConfig) -> Result<Self, ProxyError> {
        let relay = UpstreamRelay::from_config(proxy, catalog)?;
        if proxy.upstream_bearer_token.is_none() {
            tracing::warn!("No upstream credential configured; catalog requests will fail with 500");
        }

        let address = format!("{}:{}", proxy.host, proxy.port);
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|e| ProxyError::Bind {
                address: address.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            listener,
            state: ProxyState::new(relay),
        })
    }

    /// Address actually bound; resolves port 0 to the assigned port.
    ///
    /// # Errors
    ///
    /// - `ProxyError::Bind` - Socket address could not be read back
    pub fn local_addr(&self) -> Result<SocketAddr, ProxyError> {
        self.listener.local_addr().map_err(|e| ProxyError::Bind {
            address: "bound listener".to_string(),
            reason: e.to_string(),
        })
    }

    /// Serves until the process exits.
    ///
    /// # Errors
    ///
    /// - `ProxyError::Server` - Server stopped with an I/O error
    pub async fn run(self) -> Result<(), ProxyError> {
        tracing::info!(
            address = ?self.listener.local_addr().ok(),
            upstream = self.state.relay.base_url(),
            "Browsflix proxy listening"
        );
        serve(self.listener, self.state).await
    }
}

/// Serves the proxy routes on an already bound listener.
///
/// # Errors
///
/// - `ProxyError::Server` - Server stopped with an I/O error
pub async fn serve(listener: TcpListener, state: ProxyState) -> Result<(), ProxyError> {
    axum::serve(listener, router(state))
        .await
        .map_err(|e| ProxyError::Server {
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::extract::Query;
    use axum::http::{HeaderMap, Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::handlers::MoviesQuery;

    /// Stub provider: checks the bearer credential and echoes the query.
    async fn spawn_upstream(status: StatusCode) -> SocketAddr {
        let stub = Router::new()
            .route(
                "/3/discover/movie",
                get(move |headers: HeaderMap| async move {
                    upstream_answer(status, &headers, json!({ "results": [{ "id": 1, "title": "Popular" }] }))
                }),
            )
            .route(
                "/3/search/movie",
                get(move |headers: HeaderMap, Query(params): Query<MoviesQuery>| async move {
                    let title = params.query.unwrap_or_default();
                    upstream_answer(status, &headers, json!({ "results": [{ "id": 2, "title": title }] }))
                }),
            );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, stub).await.unwrap();
        });
        addr
    }

    fn upstream_answer(
        status: StatusCode,
        headers: &HeaderMap,
        body: Value,
    ) -> (StatusCode, axum::Json<Value>) {
        let authorized = headers
            .get(header::AUTHORIZATION)
            .is_some_and(|value| value == "Bearer server-token");
        if !authorized {
            return (StatusCode::UNAUTHORIZED, axum::Json(json!({ "status_code": 7 })));
        }
        (status, axum::Json(body))
    }

    fn app(base_url: String, token: Option<&str>) -> Router {
        let relay =
            UpstreamRelay::with_http_client(base_url, token.map(str::to_string), reqwest::Client::new());
        router(ProxyState::new(relay))
    }

    async fn call(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_discover_listing_is_passed_through() {
        let addr = spawn_upstream(StatusCode::OK).await;
        let app = app(format!("http://{addr}/3"), Some("server-token"));

        let (status, body) = call(app, "/movies").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"][0]["title"], "Popular");
    }

    #[tokio::test]
    async fn test_search_query_reaches_upstream_decoded() {
        let addr = spawn_upstream(StatusCode::OK).await;
        let app = app(format!("http://{addr}/3"), Some("server-token"));

        let (status, body) = call(app, "/api/movies?query=blade%20runner").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"][0]["title"], "blade runner");
    }

    #[tokio::test]
    async fn test_upstream_error_status_is_bad_gateway() {
        let addr = spawn_upstream(StatusCode::SERVICE_UNAVAILABLE).await;
        let app = app(format!("http://{addr}/3"), Some("server-token"));

        let (status, body) = call(app, "/movies?query=heat").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body, json!({ "error": "Failed to fetch movies" }));
    }

    #[tokio::test]
    async fn test_rejected_credential_is_bad_gateway() {
        let addr = spawn_upstream(StatusCode::OK).await;
        let app = app(format!("http://{addr}/3"), Some("wrong-token"));

        let (status, _) = call(app, "/movies").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_missing_credential_is_internal_error() {
        let app = app("http://127.0.0.1:9/3".to_string(), None);

        let (status, body) = call(app, "/movies").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Upstream credential not configured" }));
    }

    #[tokio::test]
    async fn test_health() {
        let app = app("http://127.0.0.1:9/3".to_string(), None);

        let (status, body) = call(app, "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_bind_resolves_ephemeral_port() {
        let proxy = ProxyConfig {
            port: 0,
            upstream_bearer_token: Some("server-token".to_string()),
            ..Default::default()
        };

        let server = ProxyServer::bind(&proxy, &CatalogConfig::default()).await.unwrap();

        assert_ne!(server.local_addr().unwrap().port(), 0);
    }

    #[tokio::test]
    async fn test_bind_reports_address_in_use() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let proxy = ProxyConfig {
            port: taken.local_addr().unwrap().port(),
            ..Default::default()
        };

        let result = ProxyServer::bind(&proxy, &CatalogConfig::default()).await;

        assert!(matches!(result, Err(ProxyError::Bind { .. })));
    }
}
