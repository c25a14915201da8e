//! Catalog provider implementations.

use async_trait::async_trait;

use crate::types::{ApiOutcome, CatalogTarget};

pub mod http;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use http::CatalogClient;
#[cfg(any(test, feature = "test-utils"))]
pub use mock::MockCatalogProvider;

/// Trait for sources that answer a catalog query.
///
/// Implementations never fail with `Err`; every failure is classified into an
/// `ApiOutcome` so the fetch strategy can tell API errors from broken
/// transports.
#[async_trait]
pub trait CatalogProvider: Send + Sync + std::fmt::Debug {
    /// Which target this provider stands for.
    fn target(&self) -> CatalogTarget;

    /// Fetch the catalog page for `query`. Empty query means discover.
    async fn fetch_catalog(&self, query: &str) -> ApiOutcome;
}
