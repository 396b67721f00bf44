//! Live scrape configuration snapshot.
//!
//! A `ConfigSnapshot` is an immutable point-in-time view of the upstream
//! scrape configuration. The API server holds the current snapshot behind
//! an atomic reference cell and replaces it wholesale on `apply_config`;
//! handlers never observe a partially updated snapshot.

use std::collections::BTreeMap;
use std::fmt::Write;

use serde::{Deserialize, Serialize};

/// Point-in-time scrape configuration served by `/api/v1/status/config`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfigSnapshot {
    pub global: GlobalConfig,
    pub scrape_configs: Vec<ScrapeJobConfig>,
}

/// Global scrape settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default interval between scrapes, in seconds.
    pub scrape_interval_secs: u64,

    /// Per-scrape timeout, in seconds.
    pub scrape_timeout_secs: u64,

    /// Labels attached to every exported sample.
    pub external_labels: BTreeMap<String, String>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            scrape_interval_secs: 60,
            scrape_timeout_secs: 10,
            external_labels: BTreeMap::new(),
        }
    }
}

/// One scrape job definition.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScrapeJobConfig {
    pub job_name: String,

    /// Overrides the global interval when set.
    pub scrape_interval_secs: Option<u64>,

    pub metrics_path: String,
    pub scheme: String,

    /// Statically configured targets (host:port).
    pub static_targets: Vec<String>,
}

impl Default for ScrapeJobConfig {
    fn default() -> Self {
        Self {
            job_name: String::new(),
            scrape_interval_secs: None,
            metrics_path: "/metrics".to_string(),
            scheme: "http".to_string(),
            static_targets: Vec::new(),
        }
    }
}

impl ConfigSnapshot {
    /// Render the snapshot as the structured text served under
    /// `data.yaml` by the status API. The output follows the monitoring
    /// system's config file format (`scrape_interval: 30s` style
    /// durations).
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("global:\n");
        let _ = writeln!(
            out,
            "  scrape_interval: {}",
            format_interval(self.global.scrape_interval_secs)
        );
        let _ = writeln!(
            out,
            "  scrape_timeout: {}",
            format_interval(self.global.scrape_timeout_secs)
        );
        if !self.global.external_labels.is_empty() {
            out.push_str("  external_labels:\n");
            for (key, value) in &self.global.external_labels {
                let _ = writeln!(out, "    {key}: {value}");
            }
        }
        if self.scrape_configs.is_empty() {
            out.push_str("scrape_configs: []\n");
            return out;
        }
        out.push_str("scrape_configs:\n");
        for job in &self.scrape_configs {
            let _ = writeln!(out, "- job_name: {}", job.job_name);
            if let Some(interval) = job.scrape_interval_secs {
                let _ = writeln!(out, "  scrape_interval: {}", format_interval(interval));
            }
            let _ = writeln!(out, "  metrics_path: {}", job.metrics_path);
            let _ = writeln!(out, "  scheme: {}", job.scheme);
            if !job.static_targets.is_empty() {
                out.push_str("  static_configs:\n  - targets:\n");
                for target in &job.static_targets {
                    let _ = writeln!(out, "    - {target}");
                }
            }
        }
        out
    }
}

/// Format a duration the way the monitoring system's config files do:
/// `30s`, `1m`, `1m30s`, `2h`.
fn format_interval(secs: u64) -> String {
    if secs == 0 {
        return "0s".to_string();
    }
    let mut out = String::new();
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if hours > 0 {
        let _ = write!(out, "{hours}h");
    }
    if minutes > 0 {
        let _ = write!(out, "{minutes}m");
    }
    if seconds > 0 {
        let _ = write!(out, "{seconds}s");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_formatting() {
        assert_eq!(format_interval(30), "30s");
        assert_eq!(format_interval(60), "1m");
        assert_eq!(format_interval(90), "1m30s");
        assert_eq!(format_interval(3600), "1h");
        assert_eq!(format_interval(3690), "1h1m30s");
        assert_eq!(format_interval(0), "0s");
    }

    #[test]
    fn render_contains_global_interval() {
        let snapshot = ConfigSnapshot {
            global: GlobalConfig {
                scrape_interval_secs: 30,
                ..GlobalConfig::default()
            },
            scrape_configs: vec![],
        };
        let yaml = snapshot.render();
        assert!(yaml.contains("scrape_interval: 30s"));
        assert!(yaml.contains("scrape_configs: []"));
    }

    #[test]
    fn render_lists_jobs_and_targets() {
        let snapshot = ConfigSnapshot {
            global: GlobalConfig::default(),
            scrape_configs: vec![ScrapeJobConfig {
                job_name: "node".to_string(),
                scrape_interval_secs: Some(15),
                static_targets: vec!["localhost:9100".to_string()],
                ..ScrapeJobConfig::default()
            }],
        };
        let yaml = snapshot.render();
        assert!(yaml.contains("- job_name: node"));
        assert!(yaml.contains("  scrape_interval: 15s"));
        assert!(yaml.contains("    - localhost:9100"));
    }

    #[test]
    fn render_includes_external_labels() {
        let mut labels = BTreeMap::new();
        labels.insert("cluster".to_string(), "eu-west".to_string());
        let snapshot = ConfigSnapshot {
            global: GlobalConfig {
                external_labels: labels,
                ..GlobalConfig::default()
            },
            scrape_configs: vec![],
        };
        assert!(snapshot.render().contains("    cluster: eu-west"));
    }
}
