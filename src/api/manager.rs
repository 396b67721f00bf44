//! API server lifecycle.
//!
//! # Responsibilities
//! - Own the HTTP listener and its `Created → Running → Stopped` lifecycle
//! - Compile the CORS policy before anything is bound
//! - Assemble the Axum router (status/query routes, metrics exposition,
//!   ingestion routes) and wire the middleware stack
//! - Hold the live configuration snapshot behind an atomic reference cell
//!   and swap it on `apply_config`
//! - Drain in-flight requests on shutdown, bounded by a grace period

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::routing::{get, post};
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use metrics_exporter_prometheus::PrometheusRecorder;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::api::{handlers, ingest};
use crate::codec::CodecRegistry;
use crate::config::cors::compile_allowed_origins;
use crate::config::{ConfigSnapshot, ServerConfig};
use crate::error::EndpointError;
use crate::observability::ApiMetrics;
use crate::scrape::{ScrapeProvider, TelemetryConsumer};

/// Prefix under which the status/query routes are mounted.
pub const API_PREFIX: &str = "/api/v1";

/// Shared state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Live configuration snapshot. Swapped wholesale by `apply_config`;
    /// handlers load it once per request and never see a torn view.
    pub snapshot: Arc<ArcSwap<ConfigSnapshot>>,
    pub provider: Arc<dyn ScrapeProvider>,
    pub consumer: Arc<dyn TelemetryConsumer>,
    pub codecs: Arc<CodecRegistry>,
    pub metrics: ApiMetrics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LifecycleState {
    Created,
    Running,
    Stopped,
}

struct Lifecycle {
    state: LifecycleState,
    handle: Option<Handle>,
    serve_task: Option<JoinHandle<std::io::Result<()>>>,
}

/// Self-managed HTTP endpoint exposing the status/query API and the
/// telemetry ingestion routes.
///
/// Construction binds nothing and cannot fail; `start` binds the listener
/// and `shutdown` releases it. An instance serves exactly one
/// start/shutdown cycle.
pub struct ApiServer {
    cfg: ServerConfig,
    state: AppState,
    lifecycle: Mutex<Lifecycle>,
    local_addr: OnceLock<SocketAddr>,
}

impl ApiServer {
    pub fn new(
        cfg: ServerConfig,
        initial: ConfigSnapshot,
        provider: Arc<dyn ScrapeProvider>,
        consumer: Arc<dyn TelemetryConsumer>,
        codecs: CodecRegistry,
        recorder: &PrometheusRecorder,
    ) -> Self {
        let state = AppState {
            snapshot: Arc::new(ArcSwap::from_pointee(initial)),
            provider,
            consumer,
            codecs: Arc::new(codecs),
            metrics: ApiMetrics::register(recorder),
        };
        Self {
            cfg,
            state,
            lifecycle: Mutex::new(Lifecycle {
                state: LifecycleState::Created,
                handle: None,
                serve_task: None,
            }),
            local_addr: OnceLock::new(),
        }
    }

    /// Compile the CORS policy, bind the listener, and begin serving in
    /// the background. Returns once the listener is accepting connections.
    ///
    /// CORS compilation and bind failures are reported synchronously and
    /// leave nothing bound. Calling `start` on a running instance fails
    /// with [`EndpointError::AlreadyRunning`] without disturbing the
    /// existing listener.
    pub async fn start(&self) -> Result<(), EndpointError> {
        let mut lifecycle = self.lifecycle.lock().await;
        match lifecycle.state {
            LifecycleState::Created => {}
            LifecycleState::Running => return Err(EndpointError::AlreadyRunning),
            LifecycleState::Stopped => return Err(EndpointError::Finished),
        }

        // Everything that can fail happens before the socket exists, except
        // the bind itself.
        let cors = match &self.cfg.cors {
            Some(cfg) => Some(compile_allowed_origins(cfg)?),
            None => None,
        };
        let tls = match &self.cfg.tls {
            Some(tls) => Some(
                RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path)
                    .await
                    .map_err(EndpointError::Tls)?,
            ),
            None => None,
        };

        let router = build_router(self.state.clone(), &self.cfg, cors);

        let listener = std::net::TcpListener::bind(&self.cfg.endpoint).map_err(|source| {
            EndpointError::Bind {
                addr: self.cfg.endpoint.clone(),
                source,
            }
        })?;
        listener
            .set_nonblocking(true)
            .map_err(|source| EndpointError::Bind {
                addr: self.cfg.endpoint.clone(),
                source,
            })?;
        let local_addr = listener.local_addr().map_err(|source| EndpointError::Bind {
            addr: self.cfg.endpoint.clone(),
            source,
        })?;

        let handle = Handle::new();
        let serve_task = match tls {
            Some(tls) => tokio::spawn(
                axum_server::from_tcp_rustls(listener, tls)
                    .handle(handle.clone())
                    .serve(router.into_make_service()),
            ),
            None => tokio::spawn(
                axum_server::from_tcp(listener)
                    .handle(handle.clone())
                    .serve(router.into_make_service()),
            ),
        };

        let _ = self.local_addr.set(local_addr);
        lifecycle.state = LifecycleState::Running;
        lifecycle.handle = Some(handle);
        lifecycle.serve_task = Some(serve_task);

        tracing::info!(address = %local_addr, tls = self.cfg.tls.is_some(), "api server listening");
        Ok(())
    }

    /// Atomically replace the configuration snapshot.
    ///
    /// In-flight requests finish against the snapshot they already loaded;
    /// requests arriving afterwards observe the new one. Never blocks on
    /// request traffic and has no effect on routes or listener state.
    pub fn apply_config(&self, snapshot: ConfigSnapshot) {
        self.state.snapshot.store(Arc::new(snapshot));
        tracing::debug!("configuration snapshot replaced");
    }

    /// Stop accepting connections and drain in-flight requests, waiting at
    /// most `grace` before remaining connections are forcibly closed.
    /// Grace expiry is a documented best-effort policy, not an error.
    pub async fn shutdown(&self, grace: Duration) -> Result<(), EndpointError> {
        let mut lifecycle = self.lifecycle.lock().await;
        if lifecycle.state != LifecycleState::Running {
            return Err(EndpointError::NotRunning);
        }

        if let Some(handle) = lifecycle.handle.take() {
            handle.graceful_shutdown(Some(grace));
        }
        if let Some(task) = lifecycle.serve_task.take() {
            match task.await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    tracing::warn!(error = %err, "serve task ended with an error during shutdown")
                }
                Err(err) => tracing::warn!(error = %err, "serve task did not shut down cleanly"),
            }
        }

        lifecycle.state = LifecycleState::Stopped;
        tracing::info!("api server stopped");
        Ok(())
    }

    /// The bound address, available after a successful `start`. Useful
    /// when the configured endpoint asked for port 0.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr.get().copied()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.cfg
    }
}

/// Assemble the router with all routes and middleware layers.
#[allow(deprecated)] // TimeoutLayer::new is deprecated in tower-http 0.6 but keeps the plain 408 behavior we want
fn build_router(state: AppState, cfg: &ServerConfig, cors: Option<CorsLayer>) -> Router {
    let api = Router::new()
        .route("/status/buildinfo", get(handlers::build_info))
        .route("/status/config", get(handlers::status_config))
        .route("/scrape_pools", get(handlers::scrape_pools))
        .route("/targets", get(handlers::targets))
        .route("/targets/metadata", get(handlers::targets_metadata));

    let mut router = Router::new()
        .nest(API_PREFIX, api)
        .route("/metrics", get(handlers::metrics_exposition))
        .route("/v1/traces", post(ingest::export_traces))
        .route("/v1/metrics", post(ingest::export_metrics))
        .route("/v1/logs", post(ingest::export_logs))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if let Some(secs) = cfg.read_timeout_secs {
        router = router.layer(TimeoutLayer::new(Duration::from_secs(secs)));
    }
    if let Some(cors) = cors {
        router = router.layer(cors);
    }
    router
}
