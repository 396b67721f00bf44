//! Shared utilities for the integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusBuilder;

use telemetry_endpoint::codec::CodecRegistry;
use telemetry_endpoint::config::{ConfigSnapshot, ServerConfig};
use telemetry_endpoint::scrape::{NoopConsumer, StaticScrapeProvider};
use telemetry_endpoint::ApiServer;

/// A server config asking the kernel for an ephemeral port, so tests
/// never race over fixed port numbers.
pub fn ephemeral_config() -> ServerConfig {
    ServerConfig {
        endpoint: "127.0.0.1:0".to_string(),
        ..ServerConfig::default()
    }
}

/// Build a server around the sample provider and a no-op consumer.
pub fn build_server(cfg: ServerConfig) -> ApiServer {
    ApiServer::new(
        cfg,
        ConfigSnapshot::default(),
        Arc::new(StaticScrapeProvider::sample()),
        Arc::new(NoopConsumer),
        CodecRegistry::with_defaults(),
        &PrometheusBuilder::new().build_recorder(),
    )
}

/// Start a server on an ephemeral port and return it with its address.
pub async fn start_server() -> (ApiServer, SocketAddr) {
    let server = build_server(ephemeral_config());
    server.start().await.expect("server should start");
    let addr = server.local_addr().expect("bound address");
    (server, addr)
}

pub fn api_url(addr: SocketAddr, path: &str) -> String {
    format!("http://{addr}/api/v1{path}")
}

pub fn url(addr: SocketAddr, path: &str) -> String {
    format!("http://{addr}{path}")
}

/// Reserve an address the kernel just handed out, then release it. Tests
/// use this when they need a concrete address that should stay unbound.
pub fn reserved_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral");
    listener.local_addr().expect("local addr")
}
