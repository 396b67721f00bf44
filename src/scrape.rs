//! Interfaces to the scrape/discovery engine and the telemetry pipeline.
//!
//! The endpoint does not schedule scrapes or store telemetry itself; it
//! queries a [`ScrapeProvider`] for target/metadata state and hands decoded
//! export requests to a [`TelemetryConsumer`]. Both are injected at
//! composition time as trait objects.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SelectorError;
use crate::pdata::{
    ExportLogsServiceRequest, ExportLogsServiceResponse, ExportMetricsServiceRequest,
    ExportMetricsServiceResponse, ExportTracesServiceRequest, ExportTracesServiceResponse,
};

/// Health of a scrape target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetHealth {
    Up,
    Down,
    Unknown,
}

/// An actively scraped target.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveTarget {
    /// Labels as discovered, before relabeling.
    pub discovered_labels: BTreeMap<String, String>,

    /// Effective labels after relabeling.
    pub labels: BTreeMap<String, String>,

    pub scrape_pool: String,
    pub scrape_url: String,
    pub health: TargetHealth,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub last_error: String,
}

/// A target dropped by relabeling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DroppedTarget {
    pub discovered_labels: BTreeMap<String, String>,
    pub scrape_pool: String,
}

/// Metadata for one metric exposed by one target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricMetadata {
    /// Labels identifying the target the metadata came from.
    pub target: BTreeMap<String, String>,
    pub metric: String,
    #[serde(rename = "type")]
    pub metric_type: String,
    pub help: String,
    pub unit: String,
}

/// Equality-matcher selector parsed from a `match_target` query parameter,
/// e.g. `{job="node",instance="localhost:9100"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetSelector {
    matchers: Vec<(String, String)>,
}

impl TargetSelector {
    /// An empty selector matches every label set.
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.matchers
            .iter()
            .all(|(key, value)| labels.get(key).map(String::as_str) == Some(value.as_str()))
    }

    pub fn matchers(&self) -> &[(String, String)] {
        &self.matchers
    }
}

impl FromStr for TargetSelector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fail = |reason: &'static str| SelectorError {
            input: s.to_string(),
            reason,
        };

        let trimmed = s.trim();
        let inner = trimmed
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .ok_or_else(|| fail("selector must be wrapped in braces"))?;

        let mut matchers = Vec::new();
        for part in inner.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| fail("matcher must have the form label=\"value\""))?;
            let key = key.trim();
            if key.is_empty()
                || !key
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_')
            {
                return Err(fail("label name must be [a-zA-Z0-9_]+"));
            }
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|rest| rest.strip_suffix('"'))
                .ok_or_else(|| fail("label value must be double-quoted"))?;
            matchers.push((key.to_string(), value.to_string()));
        }
        Ok(Self { matchers })
    }
}

/// Read-only view of the scrape engine's state, queried by the status
/// routes. Implementations must be safe for concurrent use.
pub trait ScrapeProvider: Send + Sync {
    fn scrape_pools(&self) -> Vec<String>;
    fn active_targets(&self) -> Vec<ActiveTarget>;
    fn dropped_targets(&self) -> Vec<DroppedTarget>;

    /// Metadata entries whose target labels match the selector. `None`
    /// matches everything.
    fn target_metadata(&self, selector: Option<&TargetSelector>) -> Vec<MetricMetadata>;
}

/// Downstream pipeline for decoded export requests.
pub trait TelemetryConsumer: Send + Sync {
    fn consume_traces(&self, req: ExportTracesServiceRequest) -> ExportTracesServiceResponse;
    fn consume_metrics(&self, req: ExportMetricsServiceRequest) -> ExportMetricsServiceResponse;
    fn consume_logs(&self, req: ExportLogsServiceRequest) -> ExportLogsServiceResponse;
}

/// Consumer that acknowledges everything with an empty (full-success)
/// response.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopConsumer;

impl TelemetryConsumer for NoopConsumer {
    fn consume_traces(&self, _req: ExportTracesServiceRequest) -> ExportTracesServiceResponse {
        ExportTracesServiceResponse::default()
    }

    fn consume_metrics(&self, _req: ExportMetricsServiceRequest) -> ExportMetricsServiceResponse {
        ExportMetricsServiceResponse::default()
    }

    fn consume_logs(&self, _req: ExportLogsServiceRequest) -> ExportLogsServiceResponse {
        ExportLogsServiceResponse::default()
    }
}

/// Provider serving a fixed set of pools, targets and metadata. Backs the
/// demo binary and the integration tests.
#[derive(Debug, Clone, Default)]
pub struct StaticScrapeProvider {
    pub pools: Vec<String>,
    pub active: Vec<ActiveTarget>,
    pub dropped: Vec<DroppedTarget>,
    pub metadata: Vec<MetricMetadata>,
}

impl StaticScrapeProvider {
    /// A small, fully populated provider with one "node" pool.
    pub fn sample() -> Self {
        let discovered: BTreeMap<_, _> = [
            ("__address__".to_string(), "localhost:9100".to_string()),
            ("job".to_string(), "node".to_string()),
        ]
        .into_iter()
        .collect();
        let labels: BTreeMap<_, _> = [
            ("instance".to_string(), "localhost:9100".to_string()),
            ("job".to_string(), "node".to_string()),
        ]
        .into_iter()
        .collect();

        Self {
            pools: vec!["node".to_string()],
            active: vec![ActiveTarget {
                discovered_labels: discovered.clone(),
                labels: labels.clone(),
                scrape_pool: "node".to_string(),
                scrape_url: "http://localhost:9100/metrics".to_string(),
                health: TargetHealth::Up,
                last_error: String::new(),
            }],
            dropped: vec![DroppedTarget {
                discovered_labels: [
                    ("__address__".to_string(), "localhost:9101".to_string()),
                    ("job".to_string(), "node".to_string()),
                ]
                .into_iter()
                .collect(),
                scrape_pool: "node".to_string(),
            }],
            metadata: vec![MetricMetadata {
                target: labels,
                metric: "node_cpu_seconds_total".to_string(),
                metric_type: "counter".to_string(),
                help: "Seconds the CPUs spent in each mode.".to_string(),
                unit: "seconds".to_string(),
            }],
        }
    }
}

impl ScrapeProvider for StaticScrapeProvider {
    fn scrape_pools(&self) -> Vec<String> {
        self.pools.clone()
    }

    fn active_targets(&self) -> Vec<ActiveTarget> {
        self.active.clone()
    }

    fn dropped_targets(&self) -> Vec<DroppedTarget> {
        self.dropped.clone()
    }

    fn target_metadata(&self, selector: Option<&TargetSelector>) -> Vec<MetricMetadata> {
        self.metadata
            .iter()
            .filter(|m| selector.map(|s| s.matches(&m.target)).unwrap_or(true))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_parses_single_matcher() {
        let selector: TargetSelector = "{job=\"node\"}".parse().unwrap();
        assert_eq!(
            selector.matchers(),
            &[("job".to_string(), "node".to_string())]
        );
    }

    #[test]
    fn selector_parses_multiple_matchers() {
        let selector: TargetSelector = "{job=\"node\", instance=\"localhost:9100\"}"
            .parse()
            .unwrap();
        assert_eq!(selector.matchers().len(), 2);
    }

    #[test]
    fn selector_rejects_missing_braces() {
        assert!("job=\"node\"".parse::<TargetSelector>().is_err());
    }

    #[test]
    fn selector_rejects_unquoted_value() {
        assert!("{job=node}".parse::<TargetSelector>().is_err());
    }

    #[test]
    fn selector_rejects_bad_label_name() {
        assert!("{my job=\"node\"}".parse::<TargetSelector>().is_err());
    }

    #[test]
    fn empty_selector_matches_everything() {
        let selector: TargetSelector = "{}".parse().unwrap();
        let labels: BTreeMap<_, _> = [("job".to_string(), "x".to_string())].into_iter().collect();
        assert!(selector.matches(&labels));
    }

    #[test]
    fn sample_provider_filters_metadata() {
        let provider = StaticScrapeProvider::sample();
        let all = provider.target_metadata(None);
        assert_eq!(all.len(), 1);

        let selector: TargetSelector = "{job=\"node\"}".parse().unwrap();
        assert_eq!(provider.target_metadata(Some(&selector)).len(), 1);

        let selector: TargetSelector = "{job=\"other\"}".parse().unwrap();
        assert!(provider.target_metadata(Some(&selector)).is_empty());
    }

    #[test]
    fn active_target_serializes_camel_case() {
        let provider = StaticScrapeProvider::sample();
        let json = serde_json::to_value(&provider.active[0]).unwrap();
        assert!(json.get("discoveredLabels").is_some());
        assert!(json.get("scrapePool").is_some());
        assert_eq!(json["health"], "up");
    }
}
