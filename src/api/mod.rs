//! HTTP API surface: status/query routes, ingestion routes, and the
//! server lifecycle that owns them.

pub mod handlers;
pub mod ingest;
pub mod manager;
pub mod response;

pub use manager::{ApiServer, API_PREFIX};
pub use response::ApiResponse;
