//! Browsflix Search - catalog fetching and search sessions

#![deny(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![warn(clippy::too_many_lines)]
//!
//! Fetches movie listings from the catalog proxy, falls back to the provider
//! API when the proxy is unreachable, and drives debounced search sessions
//! whose state can be observed through a handle.

pub mod endpoint;
pub mod errors;
pub mod providers;
pub mod session;
pub mod strategy;
pub mod types;

#[cfg(test)]
mod log_capture;

// Re-export main types
pub use errors::{CatalogError, SessionError};
pub use providers::{CatalogClient, CatalogProvider};
pub use session::{
    SearchDebouncer, SearchSessionHandle, SessionPhase, SessionState, spawn_search_session,
};
pub use strategy::FetchStrategy;
pub use types::{ApiOutcome, CatalogEnvelope, CatalogTarget};

/// Convenience type alias for Results with CatalogError.
pub type Result<T> = std::result::Result<T, CatalogError>;
