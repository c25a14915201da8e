//! HTTP request handlers

use axum::extract::{Query, State};
use axum::response::Json;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::errors::ProxyError;
use crate::server::ProxyState;

#[derive(Debug, Default, Deserialize)]
pub struct MoviesQuery {
    pub query: Option<String>,
}

/// Relays a catalog request; a missing or empty query yields the discover
/// listing.
///
/// # Errors
///
/// - `ProxyError` - Upstream failed or no credential is configured
pub async fn movies(
    State(state): State<ProxyState>,
    Query(params): Query<MoviesQuery>,
) -> Result<Json<Value>, ProxyError> {
    let query = params.query.unwrap_or_default();

    match state.relay.relay(&query).await {
        Ok(body) => {
            tracing::info!(query, "Relayed catalog request");
            Ok(Json(body))
        }
        Err(e) => {
            tracing::error!(query, error = %e, "Catalog relay failed");
            Err(e)
        }
    }
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
