//! HTTP catalog client for the proxy and the upstream provider.

use async_trait::async_trait;
use browsflix_core::config::CatalogConfig;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use url::Url;

use super::CatalogProvider;
use crate::endpoint::endpoint_for;
use crate::errors::CatalogError;
use crate::types::{ApiOutcome, CatalogEnvelope, CatalogTarget};

/// Single-request catalog client bound to one target.
///
/// The primary client talks to the same-origin proxy and carries no
/// credential. The fallback client talks to the provider directly and sends
/// the bearer token with `accept: application/json`.
#[derive(Clone)]
pub struct CatalogClient {
    client: reqwest::Client,
    target: CatalogTarget,
    base_url: String,
    bearer_token: Option<String>,
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("target", &self.target)
            .field("base_url", &self.base_url)
            .field("authenticated", &self.bearer_token.is_some())
            .finish_non_exhaustive()
    }
}

impl CatalogClient {
    /// Client for the proxy endpoint.
    ///
    /// # Errors
    ///
    /// - `CatalogError::ClientBuild` - HTTP client could not be constructed
    pub fn primary(config: &CatalogConfig) -> Result<Self, CatalogError> {
        Ok(Self::with_http_client(
            CatalogTarget::Primary,
            config.proxy_base_url.clone(),
            None,
            build_http_client(config)?,
        ))
    }

    /// Client for the upstream provider.
    ///
    /// # Errors
    ///
    /// - `CatalogError::ClientBuild` - HTTP client could not be constructed
    pub fn fallback(config: &CatalogConfig) -> Result<Self, CatalogError> {
        if config.bearer_token.is_none() {
            tracing::warn!("No provider credential configured; fallback requests will be unauthenticated");
        }

        Ok(Self::with_http_client(
            CatalogTarget::Fallback,
            config.provider_base_url.clone(),
            config.bearer_token.clone(),
            build_http_client(config)?,
        ))
    }

    /// Client sharing an existing connection pool.
    pub fn with_http_client(
        target: CatalogTarget,
        base_url: String,
        bearer_token: Option<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            client,
            target,
            base_url,
            bearer_token,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Endpoint this client would call for `query`.
    ///
    /// # Errors
    ///
    /// - `CatalogError::InvalidEndpoint` - Base URL does not form a valid URL
    pub fn endpoint(&self, query: &str) -> Result<Url, CatalogError> {
        endpoint_for(self.target, &self.base_url, query)
    }

    async fn request(&self, query: &str) -> Result<CatalogEnvelope, CatalogError> {
        let url = self.endpoint(query)?;
        tracing::debug!(target_kind = %self.target, endpoint = %url, "Requesting catalog");

        let mut request = self.client.get(url);
        if self.target == CatalogTarget::Fallback {
            request = request.header(ACCEPT, "application/json");
            if let Some(token) = &self.bearer_token {
                request = request.header(AUTHORIZATION, format!("Bearer {token}"));
            }
        }

        let response = request
            .send()
            .await
            .map_err(|e| CatalogError::NetworkError {
                target: self.target,
                reason: e.to_string(),
            })?;

        // Non-success statuses are transport failures; the body is not read.
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::HttpStatus {
                target: self.target,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CatalogError::NetworkError {
                target: self.target,
                reason: format!("failed to read body: {e}"),
            })?;

        serde_json::from_slice(&body).map_err(|e| CatalogError::ParseError {
            target: self.target,
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl CatalogProvider for CatalogClient {
    fn target(&self) -> CatalogTarget {
        self.target
    }

    async fn fetch_catalog(&self, query: &str) -> ApiOutcome {
        match self.request(query).await {
            Ok(envelope) => envelope.into_outcome(),
            Err(e) => ApiOutcome::TransportFailure(e),
        }
    }
}

fn build_http_client(config: &CatalogConfig) -> Result<reqwest::Client, CatalogError> {
    let mut builder = reqwest::Client::builder().user_agent(config.user_agent);
    if let Some(timeout) = config.request_timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().map_err(|e| CatalogError::ClientBuild {
        reason: e.to_string(),
    })
}
