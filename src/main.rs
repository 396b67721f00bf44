//! Demo binary: serve the endpoint with a static scrape provider and a
//! no-op telemetry consumer until interrupted.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use telemetry_endpoint::codec::CodecRegistry;
use telemetry_endpoint::config::{ConfigSnapshot, CorsConfig, ScrapeJobConfig, ServerConfig};
use telemetry_endpoint::scrape::{NoopConsumer, StaticScrapeProvider};
use telemetry_endpoint::ApiServer;

#[derive(Parser)]
#[command(about = "Telemetry ingestion endpoint with a monitoring-compatible status API")]
struct Args {
    /// Listen address.
    #[arg(long, default_value = "127.0.0.1:9090")]
    listen: String,

    /// Allowed CORS origin pattern (repeatable).
    #[arg(long = "cors-origin")]
    cors_origins: Vec<String>,

    /// Per-request read timeout in seconds.
    #[arg(long)]
    read_timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "telemetry_endpoint=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let cfg = ServerConfig {
        endpoint: args.listen,
        tls: None,
        cors: (!args.cors_origins.is_empty()).then(|| CorsConfig {
            allowed_origins: args.cors_origins,
        }),
        read_timeout_secs: args.read_timeout_secs,
    };

    let mut snapshot = ConfigSnapshot::default();
    snapshot.scrape_configs.push(ScrapeJobConfig {
        job_name: "node".to_string(),
        static_targets: vec!["localhost:9100".to_string()],
        ..ScrapeJobConfig::default()
    });

    let recorder = PrometheusBuilder::new().build_recorder();
    let server = ApiServer::new(
        cfg,
        snapshot,
        Arc::new(StaticScrapeProvider::sample()),
        Arc::new(NoopConsumer),
        CodecRegistry::with_defaults(),
        &recorder,
    );

    server.start().await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received");
    server.shutdown(Duration::from_secs(5)).await?;

    Ok(())
}
