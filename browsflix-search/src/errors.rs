//! Error types for catalog search.

use thiserror::Error;

use crate::types::CatalogTarget;

/// Transport-level failures talking to a catalog target.
///
/// These never reach the user directly; the fetch strategy substitutes the
/// fallback target and the session shows a generic message if both fail.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    /// Endpoint could not be assembled from the configured base URL.
    #[error("Invalid {target} endpoint '{url}': {reason}")]
    InvalidEndpoint {
        /// Target the endpoint was built for
        target: CatalogTarget,
        /// The URL that failed to parse
        url: String,
        /// Parser diagnostic
        reason: String,
    },

    /// HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {reason}")]
    ClientBuild {
        /// Builder diagnostic
        reason: String,
    },

    /// Request never produced a response (DNS, connect, timeout, reset).
    #[error("Network error on {target}: {reason}")]
    NetworkError {
        /// Target that was being queried
        target: CatalogTarget,
        /// The reason for the network error
        reason: String,
    },

    /// Target answered with a non-success status code.
    #[error("{target} responded with HTTP {status}")]
    HttpStatus {
        /// Target that was being queried
        target: CatalogTarget,
        /// Status code returned
        status: u16,
    },

    /// Body was not a catalog envelope.
    #[error("Parse error on {target}: {reason}")]
    ParseError {
        /// Target that was being queried
        target: CatalogTarget,
        /// The reason for the parse error
        reason: String,
    },
}

impl CatalogError {
    /// Target the failure happened on, when known.
    pub fn target(&self) -> Option<CatalogTarget> {
        match self {
            CatalogError::InvalidEndpoint { target, .. }
            | CatalogError::NetworkError { target, .. }
            | CatalogError::HttpStatus { target, .. }
            | CatalogError::ParseError { target, .. } => Some(*target),
            CatalogError::ClientBuild { .. } => None,
        }
    }
}

/// Errors returned by a search session handle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The session event loop has stopped.
    #[error("Search session has shut down")]
    Shutdown,
}
