//! Proxy server errors and their HTTP mapping.

use axum::Json;
use axum::body::Body;
use axum::http::{Response, StatusCode};
use axum::response::IntoResponse;
use serde_json::json;

/// Body message for every upstream failure.
pub const UPSTREAM_FAILURE_MESSAGE: &str = "Failed to fetch movies";

/// Body message when the proxy has no upstream credential.
pub const MISSING_CREDENTIAL_MESSAGE: &str = "Upstream credential not configured";

/// Proxy server errors
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("Upstream bearer credential is not configured")]
    MissingCredential,

    #[error("Invalid upstream endpoint: {reason}")]
    InvalidEndpoint { reason: String },

    #[error("Upstream unreachable: {reason}")]
    UpstreamUnreachable { reason: String },

    #[error("Upstream answered with status {status}")]
    UpstreamStatus { status: u16 },

    #[error("Upstream body is not valid JSON: {reason}")]
    InvalidUpstreamBody { reason: String },

    #[error("Failed to build HTTP client: {reason}")]
    ClientBuild { reason: String },

    #[error("Failed to bind {address}: {reason}")]
    Bind { address: String, reason: String },

    #[error("Server error: {reason}")]
    Server { reason: String },
}

impl ProxyError {
    /// Status code reported to clients for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::MissingCredential
            | ProxyError::ClientBuild { .. }
            | ProxyError::Bind { .. }
            | ProxyError::Server { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::InvalidEndpoint { .. }
            | ProxyError::UpstreamUnreachable { .. }
            | ProxyError::UpstreamStatus { .. }
            | ProxyError::InvalidUpstreamBody { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response<Body> {
        let message = match self {
            ProxyError::MissingCredential => MISSING_CREDENTIAL_MESSAGE,
            _ => UPSTREAM_FAILURE_MESSAGE,
        };

        (self.status_code(), Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_failures_map_to_bad_gateway() {
        let errors = [
            ProxyError::UpstreamStatus { status: 401 },
            ProxyError::UpstreamUnreachable {
                reason: "connection refused".to_string(),
            },
            ProxyError::InvalidUpstreamBody {
                reason: "expected value".to_string(),
            },
        ];

        for error in errors {
            assert_eq!(error.status_code(), StatusCode::BAD_GATEWAY);
        }
    }

    #[test]
    fn test_missing_credential_is_server_error() {
        let response = ProxyError::MissingCredential.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
