//! Observability concerns: metrics registration and exposition.

pub mod metrics;

pub use metrics::{ApiMetrics, METRICS_PREFIX};
