//! Integration tests for Browsflix
//!
//! These tests run the catalog clients, search sessions and proxy server
//! against in-process stub servers bound to loopback ports.

#[path = "style.rs"]
mod style;

#[path = "integration/stub_provider.rs"]
mod stub_provider;

#[path = "integration/fallback_flow.rs"]
mod fallback_flow;

#[path = "integration/proxy_relay.rs"]
mod proxy_relay;

#[path = "integration/session_flow.rs"]
mod session_flow;
