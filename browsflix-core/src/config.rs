//! Centralized configuration for Browsflix.
//!
//! Every endpoint, credential and timing knob lives here and is handed to
//! constructors explicitly. Nothing reads the process environment after
//! startup.

use std::path::PathBuf;
use std::time::Duration;

use crate::BrowsflixError;

/// Central configuration for all Browsflix components.
#[derive(Debug, Clone, Default)]
pub struct BrowsflixConfig {
    pub catalog: CatalogConfig,
    pub session: SessionConfig,
    pub proxy: ProxyConfig,
    pub recorder: RecorderConfig,
}

/// Where catalog requests go and how they authenticate.
#[derive(Clone)]
pub struct CatalogConfig {
    /// Base URL of the same-origin proxy (primary target)
    pub proxy_base_url: String,
    /// Base URL of the upstream provider API (fallback target)
    pub provider_base_url: String,
    /// Bearer credential attached to fallback requests
    pub bearer_token: Option<String>,
    /// Per-request timeout (None = transport default)
    pub request_timeout: Option<Duration>,
    /// User agent for HTTP requests
    pub user_agent: &'static str,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            proxy_base_url: "http://127.0.0.1:3000".to_string(),
            provider_base_url: "https://api.themoviedb.org/3".to_string(),
            bearer_token: None,
            request_timeout: None,
            user_agent: "browsflix/0.1.0",
        }
    }
}

// Credentials stay out of debug output.
impl std::fmt::Debug for CatalogConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("proxy_base_url", &self.proxy_base_url)
            .field("provider_base_url", &self.provider_base_url)
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "<redacted>"))
            .field("request_timeout", &self.request_timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Search session timing and channel sizing.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Quiet period before a raw query is considered stable
    pub debounce_interval: Duration,
    /// Capacity of the session command channel
    pub command_buffer: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debounce_interval: Duration::from_millis(500),
            command_buffer: 100,
        }
    }
}

/// Proxy server binding and its server-side upstream credential.
#[derive(Clone)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
    /// Credential the proxy uses towards the upstream provider
    pub upstream_bearer_token: Option<String>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            upstream_bearer_token: None,
        }
    }
}

impl std::fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field(
                "upstream_bearer_token",
                &self.upstream_bearer_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Search usage store location.
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    pub store_path: PathBuf,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("browsflix-searches.json"),
        }
    }
}

impl BrowsflixConfig {
    /// Creates configuration with environment variable overrides.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates configuration from an arbitrary key lookup.
    ///
    /// Unset keys keep their defaults. Numeric values that fail to parse are
    /// ignored with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("BROWSFLIX_PROXY_URL") {
            config.catalog.proxy_base_url = url;
        }

        if let Some(url) = lookup("BROWSFLIX_PROVIDER_URL") {
            config.catalog.provider_base_url = url;
        }

        if let Some(token) = lookup("BROWSFLIX_TMDB_TOKEN").filter(|t| !t.is_empty()) {
            config.catalog.bearer_token = Some(token);
        }

        if let Some(timeout) = lookup("BROWSFLIX_REQUEST_TIMEOUT") {
            match timeout.parse::<u64>() {
                Ok(seconds) => config.catalog.request_timeout = Some(Duration::from_secs(seconds)),
                Err(_) => tracing::warn!("Ignoring malformed BROWSFLIX_REQUEST_TIMEOUT={timeout}"),
            }
        }

        if let Some(debounce) = lookup("BROWSFLIX_DEBOUNCE_MS") {
            match debounce.parse::<u64>() {
                Ok(millis) => config.session.debounce_interval = Duration::from_millis(millis),
                Err(_) => tracing::warn!("Ignoring malformed BROWSFLIX_DEBOUNCE_MS={debounce}"),
            }
        }

        if let Some(host) = lookup("BROWSFLIX_PROXY_HOST") {
            config.proxy.host = host;
        }

        if let Some(port) = lookup("BROWSFLIX_PROXY_PORT") {
            match port.parse::<u16>() {
                Ok(port) => config.proxy.port = port,
                Err(_) => tracing::warn!("Ignoring malformed BROWSFLIX_PROXY_PORT={port}"),
            }
        }

        if let Some(token) = lookup("TMDB_API_KEY").filter(|t| !t.is_empty()) {
            config.proxy.upstream_bearer_token = Some(token);
        }

        if let Some(path) = lookup("BROWSFLIX_SEARCH_STORE") {
            config.recorder.store_path = PathBuf::from(path);
        }

        config
    }

    /// Creates a configuration for fast, local tests.
    pub fn for_testing() -> Self {
        Self {
            catalog: CatalogConfig {
                proxy_base_url: "http://127.0.0.1:9".to_string(),
                provider_base_url: "http://127.0.0.1:9/3".to_string(),
                bearer_token: Some("test-token".to_string()),
                ..Default::default()
            },
            session: SessionConfig {
                debounce_interval: Duration::from_millis(20),
                ..Default::default()
            },
            proxy: ProxyConfig {
                port: 0,
                ..Default::default()
            },
            recorder: RecorderConfig {
                store_path: std::env::temp_dir().join("browsflix-test-searches.json"),
            },
        }
    }

    /// Checks values that would make the search layer unusable.
    ///
    /// # Errors
    ///
    /// - `BrowsflixError::Configuration` - Empty base URL or zero debounce interval
    pub fn validate(&self) -> crate::Result<()> {
        if self.catalog.proxy_base_url.trim().is_empty() {
            return Err(BrowsflixError::Configuration {
                reason: "proxy base URL is empty".to_string(),
            });
        }
        if self.catalog.provider_base_url.trim().is_empty() {
            return Err(BrowsflixError::Configuration {
                reason: "provider base URL is empty".to_string(),
            });
        }
        if self.session.debounce_interval.is_zero() {
            return Err(BrowsflixError::Configuration {
                reason: "debounce interval must be positive".to_string(),
            });
        }
        if self.session.command_buffer == 0 {
            return Err(BrowsflixError::Configuration {
                reason: "command buffer must hold at least one command".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config_values() {
        let config = BrowsflixConfig::default();

        assert_eq!(config.catalog.proxy_base_url, "http://127.0.0.1:3000");
        assert_eq!(
            config.catalog.provider_base_url,
            "https://api.themoviedb.org/3"
        );
        assert!(config.catalog.bearer_token.is_none());
        assert!(config.catalog.request_timeout.is_none());
        assert_eq!(
            config.session.debounce_interval,
            Duration::from_millis(500)
        );
        assert_eq!(config.proxy.port, 3000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_lookup_overrides() {
        let config = BrowsflixConfig::from_lookup(lookup_from(&[
            ("BROWSFLIX_PROXY_URL", "http://localhost:8080/api"),
            ("BROWSFLIX_PROVIDER_URL", "http://tmdb.local/3"),
            ("BROWSFLIX_TMDB_TOKEN", "secret"),
            ("BROWSFLIX_REQUEST_TIMEOUT", "15"),
            ("BROWSFLIX_DEBOUNCE_MS", "250"),
            ("BROWSFLIX_PROXY_PORT", "4000"),
            ("TMDB_API_KEY", "server-secret"),
            ("BROWSFLIX_SEARCH_STORE", "/tmp/searches.json"),
        ]));

        assert_eq!(config.catalog.proxy_base_url, "http://localhost:8080/api");
        assert_eq!(config.catalog.provider_base_url, "http://tmdb.local/3");
        assert_eq!(config.catalog.bearer_token.as_deref(), Some("secret"));
        assert_eq!(
            config.catalog.request_timeout,
            Some(Duration::from_secs(15))
        );
        assert_eq!(
            config.session.debounce_interval,
            Duration::from_millis(250)
        );
        assert_eq!(config.proxy.port, 4000);
        assert_eq!(
            config.proxy.upstream_bearer_token.as_deref(),
            Some("server-secret")
        );
        assert_eq!(
            config.recorder.store_path,
            PathBuf::from("/tmp/searches.json")
        );
    }

    #[test]
    fn test_malformed_numbers_keep_defaults() {
        let config = BrowsflixConfig::from_lookup(lookup_from(&[
            ("BROWSFLIX_DEBOUNCE_MS", "soon"),
            ("BROWSFLIX_PROXY_PORT", "99999"),
            ("BROWSFLIX_TMDB_TOKEN", ""),
        ]));

        assert_eq!(
            config.session.debounce_interval,
            Duration::from_millis(500)
        );
        assert_eq!(config.proxy.port, 3000);
        assert!(config.catalog.bearer_token.is_none());
    }

    #[test]
    fn test_validate_rejects_unusable_values() {
        let mut config = BrowsflixConfig::default();
        config.session.debounce_interval = Duration::ZERO;
        assert!(matches!(
            config.validate(),
            Err(BrowsflixError::Configuration { .. })
        ));

        let mut config = BrowsflixConfig::default();
        config.catalog.provider_base_url = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_output_redacts_credentials() {
        let config = BrowsflixConfig::for_testing();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("test-token"));
        assert!(rendered.contains("<redacted>"));
    }
}
