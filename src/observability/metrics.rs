//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Register the endpoint's counters against a manager-scoped Prometheus
//!   recorder (no process-global recorder involved)
//! - Apply the fixed name prefix to every metric
//! - Render the text exposition for `GET /metrics`
//!
//! # Metrics
//! - `telemetry_endpoint_target_scrape_pools_total` (counter): scrape-pool
//!   query operations served
//! - `telemetry_endpoint_target_queries_total` (counter): target list and
//!   metadata queries served
//! - `telemetry_endpoint_export_requests_total` (counter): ingestion
//!   requests accepted for decoding

use metrics::Counter;
use metrics_exporter_prometheus::{PrometheusHandle, PrometheusRecorder};

/// Fixed prefix applied to every metric the endpoint registers.
pub const METRICS_PREFIX: &str = "telemetry_endpoint_";

/// Counter handles plus the render handle, shared by the HTTP handlers.
///
/// The counters stay bound to the recorder's registry after registration,
/// so increments are lock-free atomic operations.
#[derive(Clone)]
pub struct ApiMetrics {
    handle: PrometheusHandle,
    pub scrape_pools_total: Counter,
    pub target_queries_total: Counter,
    pub export_requests_total: Counter,
}

impl ApiMetrics {
    /// Register all counters against the given recorder.
    pub fn register(recorder: &PrometheusRecorder) -> Self {
        let handle = recorder.handle();
        metrics::with_local_recorder(recorder, || Self {
            handle,
            scrape_pools_total: metrics::counter!(format!(
                "{METRICS_PREFIX}target_scrape_pools_total"
            )),
            target_queries_total: metrics::counter!(format!(
                "{METRICS_PREFIX}target_queries_total"
            )),
            export_requests_total: metrics::counter!(format!(
                "{METRICS_PREFIX}export_requests_total"
            )),
        })
    }

    /// Render the Prometheus text exposition.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_exporter_prometheus::PrometheusBuilder;

    #[test]
    fn counters_render_under_the_fixed_prefix() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let metrics = ApiMetrics::register(&recorder);
        metrics.scrape_pools_total.increment(1);
        metrics.scrape_pools_total.increment(1);

        let exposition = metrics.render();
        assert!(exposition.contains("telemetry_endpoint_target_scrape_pools_total 2"));
    }

    #[test]
    fn registries_are_isolated_per_manager() {
        let first = ApiMetrics::register(&PrometheusBuilder::new().build_recorder());
        let second = ApiMetrics::register(&PrometheusBuilder::new().build_recorder());
        first.export_requests_total.increment(5);

        assert!(first
            .render()
            .contains("telemetry_endpoint_export_requests_total 5"));
        assert!(!second
            .render()
            .contains("telemetry_endpoint_export_requests_total 5"));
    }
}
