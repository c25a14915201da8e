//! Endpoint construction for both catalog targets.
//!
//! An empty query always maps to the popularity-sorted discover listing; any
//! other query maps to search-by-term with the term percent-encoded.

use url::Url;

use crate::errors::CatalogError;
use crate::types::CatalogTarget;

/// Proxy endpoint: `{base}/movies` or `{base}/movies?query=<term>`.
///
/// # Errors
///
/// - `CatalogError::InvalidEndpoint` - Base URL does not form a valid URL
pub fn proxy_endpoint(base_url: &str, query: &str) -> Result<Url, CatalogError> {
    let base = base_url.trim_end_matches('/');
    let raw = if query.is_empty() {
        format!("{base}/movies")
    } else {
        format!("{base}/movies?query={}", urlencoding::encode(query))
    };
    parse(CatalogTarget::Primary, raw)
}

/// Upstream provider endpoint: search-by-term or popularity-sorted discover.
///
/// # Errors
///
/// - `CatalogError::InvalidEndpoint` - Base URL does not form a valid URL
pub fn provider_endpoint(base_url: &str, query: &str) -> Result<Url, CatalogError> {
    let base = base_url.trim_end_matches('/');
    let raw = if query.is_empty() {
        format!("{base}/discover/movie?sort_by=popularity.desc")
    } else {
        format!("{base}/search/movie?query={}", urlencoding::encode(query))
    };
    parse(CatalogTarget::Fallback, raw)
}

/// Endpoint for `target`, rooted at `base_url`.
///
/// # Errors
///
/// - `CatalogError::InvalidEndpoint` - Base URL does not form a valid URL
pub fn endpoint_for(target: CatalogTarget, base_url: &str, query: &str) -> Result<Url, CatalogError> {
    match target {
        CatalogTarget::Primary => proxy_endpoint(base_url, query),
        CatalogTarget::Fallback => provider_endpoint(base_url, query),
    }
}

fn parse(target: CatalogTarget, raw: String) -> Result<Url, CatalogError> {
    Url::parse(&raw).map_err(|e| CatalogError::InvalidEndpoint {
        target,
        url: raw,
        reason: e.to_string(),
    })
}
