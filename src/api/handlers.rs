//! Status and query route handlers.
//!
//! Every handler reads the current configuration snapshot (or the scrape
//! provider) and wraps its payload in the generic [`ApiResponse`]
//! envelope. Handlers never fail the server; malformed query input is
//! answered with a 4xx envelope.

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::manager::AppState;
use crate::api::response::{error_type, ApiResponse};
use crate::scrape::{ActiveTarget, DroppedTarget, MetricMetadata, TargetSelector};

#[derive(Debug, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    pub revision: &'static str,
    pub branch: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ConfigData {
    pub yaml: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapePoolsData {
    pub scrape_pools: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TargetsData {
    pub active: Vec<ActiveTarget>,
    pub dropped: Vec<DroppedTarget>,
}

#[derive(Debug, Deserialize)]
pub struct MetadataQuery {
    pub match_target: Option<String>,
}

/// `GET /api/v1/status/buildinfo`
pub async fn build_info() -> Json<ApiResponse<BuildInfo>> {
    Json(ApiResponse::success(BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        revision: option_env!("BUILD_REVISION").unwrap_or("unknown"),
        branch: option_env!("BUILD_BRANCH").unwrap_or("unknown"),
    }))
}

/// `GET /api/v1/status/config`
///
/// Reads the snapshot through one atomic load; concurrent `apply_config`
/// calls are observed all-or-nothing.
pub async fn status_config(State(state): State<AppState>) -> Json<ApiResponse<ConfigData>> {
    let snapshot = state.snapshot.load_full();
    Json(ApiResponse::success(ConfigData {
        yaml: snapshot.render(),
    }))
}

/// `GET /api/v1/scrape_pools`
pub async fn scrape_pools(State(state): State<AppState>) -> Json<ApiResponse<ScrapePoolsData>> {
    state.metrics.scrape_pools_total.increment(1);
    Json(ApiResponse::success(ScrapePoolsData {
        scrape_pools: state.provider.scrape_pools(),
    }))
}

/// `GET /api/v1/targets`
pub async fn targets(State(state): State<AppState>) -> Json<ApiResponse<TargetsData>> {
    state.metrics.target_queries_total.increment(1);
    Json(ApiResponse::success(TargetsData {
        active: state.provider.active_targets(),
        dropped: state.provider.dropped_targets(),
    }))
}

/// `GET /api/v1/targets/metadata?match_target={job="node"}`
pub async fn targets_metadata(
    State(state): State<AppState>,
    Query(query): Query<MetadataQuery>,
) -> Response {
    state.metrics.target_queries_total.increment(1);

    let selector = match query.match_target.as_deref() {
        Some(raw) => match raw.parse::<TargetSelector>() {
            Ok(selector) => Some(selector),
            Err(err) => {
                tracing::debug!(error = %err, "rejected target metadata query");
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ApiResponse::<()>::error(error_type::BAD_DATA, err.to_string())),
                )
                    .into_response();
            }
        },
        None => None,
    };

    let entries: Vec<MetricMetadata> = state.provider.target_metadata(selector.as_ref());
    Json(ApiResponse::success(entries)).into_response()
}

/// `GET /metrics` (outside the API prefix)
pub async fn metrics_exposition(State(state): State<AppState>) -> Response {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
        .into_response()
}
