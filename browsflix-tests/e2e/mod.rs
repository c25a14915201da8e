//! End-to-end tests for Browsflix
//!
//! Full stack: stub provider, the real proxy server, and a search session
//! whose clients talk to both over loopback HTTP.

#[path = "../integration/stub_provider.rs"]
mod stub_provider;

mod search_workflow;
