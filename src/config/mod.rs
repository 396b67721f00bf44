//! Configuration for the telemetry endpoint.
//!
//! Split into two halves with very different lifetimes:
//! - [`schema`]: the immutable per-start server configuration (listen
//!   address, TLS, CORS, timeouts).
//! - [`snapshot`]: the live scrape configuration view served by the status
//!   routes, replaced wholesale on every `apply_config`.

pub mod cors;
pub mod schema;
pub mod snapshot;

pub use schema::{CorsConfig, ServerConfig, TlsConfig};
pub use snapshot::{ConfigSnapshot, GlobalConfig, ScrapeJobConfig};
