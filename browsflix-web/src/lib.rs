//! Browsflix Web - catalog proxy server

#![warn(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![warn(clippy::too_many_lines)]
//!
//! Relays catalog requests to the upstream provider with a server-side
//! credential, so clients never hold it. Upstream trouble is reported as a
//! gateway failure, which clients treat as a transport failure and fall back.

pub mod errors;
pub mod handlers;
pub mod relay;
pub mod server;

// Re-export main types
pub use errors::ProxyError;
pub use relay::UpstreamRelay;
pub use server::{ProxyServer, ProxyState, router, serve};
