//! Data types shared by the catalog client, fetch strategy and session.

use browsflix_core::Movie;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::CatalogError;

/// Message used when the provider flags a failure without explaining it.
pub const DEFAULT_API_ERROR_MESSAGE: &str = "Error fetching movies";

/// Which endpoint family a catalog client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CatalogTarget {
    /// Same-origin proxy holding the credential server-side
    Primary,
    /// Upstream provider called directly with a bearer credential
    Fallback,
}

impl std::fmt::Display for CatalogTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// Result of asking a catalog target (or the whole strategy) for movies.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiOutcome {
    /// Movies in upstream order. Possibly empty.
    Success(Vec<Movie>),
    /// Well-formed envelope the provider marked as failed.
    ApiError(String),
    /// No usable envelope; the cause is for diagnostics only.
    TransportFailure(CatalogError),
}

impl ApiOutcome {
    /// Movies for a successful outcome, `None` otherwise.
    pub fn results(&self) -> Option<&[Movie]> {
        match self {
            ApiOutcome::Success(results) => Some(results),
            _ => None,
        }
    }
}

/// JSON body returned by both the proxy and the upstream provider.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogEnvelope {
    /// Failure marker, `"False"` on error
    #[serde(rename = "Response", default)]
    pub response: Option<Value>,
    /// Provider's failure explanation
    #[serde(rename = "Error", default)]
    pub error: Option<String>,
    #[serde(default)]
    pub results: Option<Vec<Movie>>,
}

impl CatalogEnvelope {
    /// True when the envelope carries an explicit failure marker.
    pub fn is_failure(&self) -> bool {
        match &self.response {
            Some(Value::String(flag)) => flag.eq_ignore_ascii_case("false"),
            Some(Value::Bool(flag)) => !flag,
            _ => false,
        }
    }

    /// Converts a parsed envelope into an outcome.
    pub fn into_outcome(self) -> ApiOutcome {
        if self.is_failure() {
            let message = self
                .error
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| DEFAULT_API_ERROR_MESSAGE.to_string());
            return ApiOutcome::ApiError(message);
        }

        ApiOutcome::Success(self.results.unwrap_or_default())
    }
}
