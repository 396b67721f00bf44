//! Self-managed telemetry ingestion endpoint.
//!
//! An HTTP server exposing a status/query API compatible with a well-known
//! monitoring system's API surface, plus ingestion routes that decode and
//! encode telemetry export payloads across multiple wire formats behind a
//! single [`codec::Encoder`] abstraction.
//!
//! # Architecture Overview
//!
//! ```text
//!   POST /v1/{traces,metrics,logs}      GET /api/v1/*, /metrics
//!              │                                  │
//!              ▼                                  ▼
//!      ┌──────────────┐                  ┌────────────────┐
//!      │    codec     │                  │    handlers    │
//!      │  registry    │                  │ (status/query) │
//!      └──────┬───────┘                  └───────┬────────┘
//!             │ canonical types                  │ atomic load
//!             ▼                                  ▼
//!      ┌──────────────┐                  ┌────────────────┐
//!      │  consumer    │                  │ ConfigSnapshot │◀── apply_config
//!      │ (collaborator)│                 │   (arc-swap)   │
//!      └──────────────┘                  └────────────────┘
//!
//!             ApiServer owns the listener lifecycle:
//!             Created ── start ──▶ Running ── shutdown ──▶ Stopped
//! ```

pub mod api;
pub mod codec;
pub mod config;
pub mod error;
pub mod observability;
pub mod pdata;
pub mod scrape;

pub use api::{ApiResponse, ApiServer, API_PREFIX};
pub use codec::{CodecError, CodecRegistry, Encoder};
pub use config::{ConfigSnapshot, ServerConfig};
pub use error::EndpointError;
