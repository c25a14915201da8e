//! Upstream provider relay.

use browsflix_core::config::{CatalogConfig, ProxyConfig};
use browsflix_search::endpoint::provider_endpoint;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde_json::Value;

use crate::errors::ProxyError;

/// Forwards catalog queries to the provider with the server-side credential.
#[derive(Clone)]
pub struct UpstreamRelay {
    client: reqwest::Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl std::fmt::Debug for UpstreamRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamRelay")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.bearer_token.is_some())
            .finish_non_exhaustive()
    }
}

impl UpstreamRelay {
    /// Relay towards the configured provider, authenticated with the proxy
    /// credential.
    ///
    /// # Errors
    ///
    /// - `ProxyError::ClientBuild` - HTTP client could not be constructed
    pub fn from_config(proxy: &ProxyConfig, catalog: &CatalogConfig) -> Result<Self, ProxyError> {
        let mut builder = reqwest::Client::builder().user_agent(catalog.user_agent);
        if let Some(timeout) = catalog.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| ProxyError::ClientBuild {
            reason: e.to_string(),
        })?;

        Ok(Self::with_http_client(
            catalog.provider_base_url.clone(),
            proxy.upstream_bearer_token.clone(),
            client,
        ))
    }

    pub fn with_http_client(
        base_url: String,
        bearer_token: Option<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            client,
            base_url,
            bearer_token,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches the provider answer for `query` (empty = discover listing).
    ///
    /// # Errors
    ///
    /// - `ProxyError::MissingCredential` - No upstream credential configured
    /// - `ProxyError::InvalidEndpoint` - Provider base URL is malformed
    /// - `ProxyError::UpstreamUnreachable` - Request produced no response
    /// - `ProxyError::UpstreamStatus` - Provider answered with a non-2xx status
    /// - `ProxyError::InvalidUpstreamBody` - Provider body is not JSON
    pub async fn relay(&self, query: &str) -> Result<Value, ProxyError> {
        let token = self
            .bearer_token
            .as_deref()
            .ok_or(ProxyError::MissingCredential)?;

        let url = provider_endpoint(&self.base_url, query).map_err(|e| {
            ProxyError::InvalidEndpoint {
                reason: e.to_string(),
            }
        })?;

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .send()
            .await
            .map_err(|e| ProxyError::UpstreamUnreachable {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProxyError::UpstreamStatus {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ProxyError::UpstreamUnreachable {
                reason: e.to_string(),
            })?;

        serde_json::from_slice(&body).map_err(|e| ProxyError::InvalidUpstreamBody {
            reason: e.to_string(),
        })
    }
}
