//! Canonical telemetry data model.
//!
//! Compact OTLP-style export request/response types for the three signals.
//! Every message carries both prost field attributes (binary structured
//! encoding) and Serde derives (JSON), so a single set of structs backs
//! all registered wire formats.

pub mod common;
pub mod logs;
pub mod metrics;
pub mod traces;

pub use common::{ExportPartialSuccess, KeyValue, Resource, StatusMessage};
pub use logs::{ExportLogsServiceRequest, ExportLogsServiceResponse, LogRecord, ResourceLogs};
pub use metrics::{
    ExportMetricsServiceRequest, ExportMetricsServiceResponse, Metric, NumberDataPoint,
    ResourceMetrics,
};
pub use traces::{ExportTracesServiceRequest, ExportTracesServiceResponse, ResourceSpans, Span};
