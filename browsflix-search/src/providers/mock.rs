//! Scripted catalog provider for tests.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use browsflix_core::Movie;
use parking_lot::Mutex;

use super::CatalogProvider;
use crate::errors::CatalogError;
use crate::types::{ApiOutcome, CatalogTarget};

#[derive(Debug, Clone)]
struct ScriptedResponse {
    outcome: ApiOutcome,
    delay: Duration,
}

/// Provider answering from a per-query script and logging every call.
///
/// Queries without a script entry receive the default outcome, which starts
/// as an empty success.
#[derive(Debug)]
pub struct MockCatalogProvider {
    target: CatalogTarget,
    default_response: ScriptedResponse,
    scripted: HashMap<String, ScriptedResponse>,
    calls: Mutex<Vec<String>>,
}

impl MockCatalogProvider {
    /// Creates a provider that answers every query with an empty success.
    pub fn new(target: CatalogTarget) -> Self {
        Self::returning(target, ApiOutcome::Success(Vec::new()))
    }

    /// Creates a provider that answers every query with `outcome`.
    pub fn returning(target: CatalogTarget, outcome: ApiOutcome) -> Self {
        Self {
            target,
            default_response: ScriptedResponse {
                outcome,
                delay: Duration::ZERO,
            },
            scripted: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Creates a provider whose every call fails at the transport level.
    pub fn unreachable(target: CatalogTarget) -> Self {
        Self::returning(
            target,
            ApiOutcome::TransportFailure(CatalogError::NetworkError {
                target,
                reason: "connection refused".to_string(),
            }),
        )
    }

    /// Answers `query` with `outcome`.
    pub fn with_response(self, query: &str, outcome: ApiOutcome) -> Self {
        self.with_delayed_response(query, outcome, Duration::ZERO)
    }

    /// Answers `query` with `outcome` after `delay`.
    pub fn with_delayed_response(mut self, query: &str, outcome: ApiOutcome, delay: Duration) -> Self {
        self.scripted
            .insert(query.to_string(), ScriptedResponse { outcome, delay });
        self
    }

    /// Queries received so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl CatalogProvider for MockCatalogProvider {
    fn target(&self) -> CatalogTarget {
        self.target
    }

    async fn fetch_catalog(&self, query: &str) -> ApiOutcome {
        self.calls.lock().push(query.to_string());

        let response = self
            .scripted
            .get(query)
            .unwrap_or(&self.default_response)
            .clone();

        if !response.delay.is_zero() {
            tokio::time::sleep(response.delay).await;
        }
        response.outcome
    }
}

/// Success outcome listing the given `(id, title)` pairs.
pub fn success_with(movies: &[(u64, &str)]) -> ApiOutcome {
    ApiOutcome::Success(
        movies
            .iter()
            .map(|(id, title)| Movie::new(*id, *title))
            .collect(),
    )
}
