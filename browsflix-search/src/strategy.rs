//! Primary/fallback fetch strategy.
//!
//! The proxy is asked first. A well-formed answer from it, including an API
//! error, is final. Only a transport failure sends the query to the provider
//! directly, and whatever the provider answers is final.

use std::sync::Arc;

use browsflix_core::config::CatalogConfig;

use crate::errors::CatalogError;
use crate::providers::{CatalogClient, CatalogProvider};
use crate::types::ApiOutcome;

/// Resolves queries through a primary provider with one fallback substitution.
#[derive(Debug, Clone)]
pub struct FetchStrategy {
    primary: Arc<dyn CatalogProvider>,
    fallback: Arc<dyn CatalogProvider>,
}

impl FetchStrategy {
    pub fn new(primary: Arc<dyn CatalogProvider>, fallback: Arc<dyn CatalogProvider>) -> Self {
        Self { primary, fallback }
    }

    /// Proxy-first strategy built from configuration.
    ///
    /// # Errors
    ///
    /// - `CatalogError::ClientBuild` - HTTP client could not be constructed
    pub fn from_config(config: &CatalogConfig) -> Result<Self, CatalogError> {
        Ok(Self::new(
            Arc::new(CatalogClient::primary(config)?),
            Arc::new(CatalogClient::fallback(config)?),
        ))
    }

    /// Resolve `query` to an outcome.
    ///
    /// Returns `TransportFailure` only when both targets failed; the cause is
    /// the fallback's. Reporting that failure is left to the caller, which
    /// knows whether the outcome is still current.
    pub async fn resolve(&self, query: &str) -> ApiOutcome {
        match self.primary.fetch_catalog(query).await {
            ApiOutcome::TransportFailure(cause) => {
                tracing::warn!(
                    query,
                    error = %cause,
                    "Primary catalog unavailable, falling back to provider"
                );
            }
            outcome => return outcome,
        }

        self.fallback.fetch_catalog(query).await
    }
}

#[cfg(test)]
mod tests {
    use browsflix_core::Movie;
    use tracing::Level;

    use super::*;
    use crate::log_capture::CapturedEvents;
    use crate::providers::MockCatalogProvider;
    use crate::providers::mock::success_with;
    use crate::types::CatalogTarget;

    fn strategy(
        primary: MockCatalogProvider,
        fallback: MockCatalogProvider,
    ) -> (FetchStrategy, Arc<MockCatalogProvider>, Arc<MockCatalogProvider>) {
        let primary = Arc::new(primary);
        let fallback = Arc::new(fallback);
        (
            FetchStrategy::new(primary.clone(), fallback.clone()),
            primary,
            fallback,
        )
    }

    #[tokio::test]
    async fn test_primary_success_skips_fallback() {
        let (strategy, primary, fallback) = strategy(
            MockCatalogProvider::returning(CatalogTarget::Primary, success_with(&[(7, "Se7en")])),
            MockCatalogProvider::new(CatalogTarget::Fallback),
        );

        let outcome = strategy.resolve("seven").await;

        assert_eq!(outcome, success_with(&[(7, "Se7en")]));
        assert_eq!(primary.calls(), vec!["seven"]);
        assert_eq!(fallback.call_count(), 0);
    }

    #[tokio::test]
    async fn test_primary_api_error_is_final() {
        let (strategy, _primary, fallback) = strategy(
            MockCatalogProvider::returning(
                CatalogTarget::Primary,
                ApiOutcome::ApiError("No results".to_string()),
            ),
            MockCatalogProvider::returning(CatalogTarget::Fallback, success_with(&[(1, "X")])),
        );

        let outcome = strategy.resolve("zzzz").await;

        assert_eq!(outcome, ApiOutcome::ApiError("No results".to_string()));
        assert_eq!(fallback.call_count(), 0);
    }

    #[tokio::test]
    async fn test_primary_transport_failure_uses_fallback() {
        let (strategy, primary, fallback) = strategy(
            MockCatalogProvider::unreachable(CatalogTarget::Primary),
            MockCatalogProvider::returning(CatalogTarget::Fallback, success_with(&[(1, "X")])),
        );

        let outcome = strategy.resolve("query").await;

        assert_eq!(outcome, ApiOutcome::Success(vec![Movie::new(1, "X")]));
        assert_eq!(primary.calls(), vec!["query"]);
        assert_eq!(fallback.calls(), vec!["query"]);
    }

    #[tokio::test]
    async fn test_fallback_api_error_is_returned() {
        let (strategy, _, _) = strategy(
            MockCatalogProvider::unreachable(CatalogTarget::Primary),
            MockCatalogProvider::returning(
                CatalogTarget::Fallback,
                ApiOutcome::ApiError("Invalid API key".to_string()),
            ),
        );

        assert_eq!(
            strategy.resolve("x").await,
            ApiOutcome::ApiError("Invalid API key".to_string())
        );
    }

    #[tokio::test]
    async fn test_both_failing_reports_fallback_cause() {
        let (strategy, _, fallback) = strategy(
            MockCatalogProvider::unreachable(CatalogTarget::Primary),
            MockCatalogProvider::returning(
                CatalogTarget::Fallback,
                ApiOutcome::TransportFailure(CatalogError::HttpStatus {
                    target: CatalogTarget::Fallback,
                    status: 503,
                }),
            ),
        );

        let outcome = strategy.resolve("").await;

        match outcome {
            ApiOutcome::TransportFailure(cause) => {
                assert_eq!(cause.target(), Some(CatalogTarget::Fallback));
            }
            other => panic!("expected transport failure, got {other:?}"),
        }
        assert_eq!(fallback.calls(), vec![""]);
    }

    #[tokio::test]
    async fn test_total_failure_logs_fallback_without_error() {
        let (events, _guard) = CapturedEvents::install();
        let (strategy, _, _) = strategy(
            MockCatalogProvider::unreachable(CatalogTarget::Primary),
            MockCatalogProvider::unreachable(CatalogTarget::Fallback),
        );

        let outcome = strategy.resolve("heat").await;

        assert!(matches!(outcome, ApiOutcome::TransportFailure(_)));
        assert_eq!(events.count(Level::WARN), 1);
        assert_eq!(events.count(Level::ERROR), 0);
    }
}
