//! Telemetry ingestion handlers.
//!
//! One handler body serves all three signals: the content type picks the
//! encoder, the encoder produces the canonical request, the consumer
//! produces the canonical response, and the same encoder serializes it
//! back. Decode failures answer 400, encode failures 500, unknown content
//! types 415 — each with a StatusMessage body, never a crash.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::api::manager::AppState;
use crate::api::response::{error_type, ApiResponse};
use crate::codec::{CodecError, Encoder};
use crate::pdata::StatusMessage;

#[derive(Debug, Clone, Copy)]
enum Signal {
    Traces,
    Metrics,
    Logs,
}

impl Signal {
    fn name(self) -> &'static str {
        match self {
            Signal::Traces => "traces",
            Signal::Metrics => "metrics",
            Signal::Logs => "logs",
        }
    }
}

/// `POST /v1/traces`
pub async fn export_traces(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    export(state, headers, body, Signal::Traces).await
}

/// `POST /v1/metrics`
pub async fn export_metrics(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    export(state, headers, body, Signal::Metrics).await
}

/// `POST /v1/logs`
pub async fn export_logs(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    export(state, headers, body, Signal::Logs).await
}

async fn export(state: AppState, headers: HeaderMap, body: Bytes, signal: Signal) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let Some(encoder) = state.codecs.get(content_type) else {
        tracing::debug!(content_type, signal = signal.name(), "unsupported content type");
        return (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Json(ApiResponse::<()>::error(
                error_type::NOT_ACCEPTABLE,
                format!("unsupported content type: {content_type:?}"),
            )),
        )
            .into_response();
    };

    state.metrics.export_requests_total.increment(1);

    let outcome = match signal {
        Signal::Traces => encoder
            .unmarshal_traces_request(&body)
            .and_then(|req| encoder.marshal_traces_response(&state.consumer.consume_traces(req))),
        Signal::Metrics => encoder
            .unmarshal_metrics_request(&body)
            .and_then(|req| encoder.marshal_metrics_response(&state.consumer.consume_metrics(req))),
        Signal::Logs => encoder
            .unmarshal_logs_request(&body)
            .and_then(|req| encoder.marshal_logs_response(&state.consumer.consume_logs(req))),
    };

    match outcome {
        Ok(bytes) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, encoder.content_type())],
            bytes,
        )
            .into_response(),
        Err(err) => {
            let status = if err.is_decode() {
                tracing::debug!(signal = signal.name(), error = %err, "rejected export request");
                StatusCode::BAD_REQUEST
            } else {
                tracing::error!(signal = signal.name(), error = %err, "failed to encode export response");
                StatusCode::INTERNAL_SERVER_ERROR
            };
            status_response(encoder.as_ref(), status, &err)
        }
    }
}

/// Serialize the StatusMessage body with the negotiated encoder, falling
/// back to plain text if even that fails. The stable errorType
/// discriminator rides along in the details so programmatic clients can
/// branch without parsing the message text.
fn status_response(encoder: &dyn Encoder, status: StatusCode, err: &CodecError) -> Response {
    let mut message = StatusMessage::new(i32::from(status.as_u16()), err.to_string());
    message.details.push(
        if err.is_decode() {
            error_type::BAD_DATA
        } else {
            error_type::INTERNAL
        }
        .to_string(),
    );
    match encoder.marshal_status(&message) {
        Ok(bytes) => (
            status,
            [(header::CONTENT_TYPE, encoder.content_type())],
            bytes,
        )
            .into_response(),
        Err(marshal_err) => {
            tracing::error!(error = %marshal_err, "failed to marshal status message");
            (status, err.to_string()).into_response()
        }
    }
}
