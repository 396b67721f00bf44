//! Ingestion route tests: content negotiation and per-format error
//! semantics.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;
use prost::Message;
use serde_json::Value;

use telemetry_endpoint::codec::{CodecError, CodecRegistry, Encoder};
use telemetry_endpoint::config::ConfigSnapshot;
use telemetry_endpoint::pdata::{
    ExportLogsServiceRequest, ExportLogsServiceResponse, ExportMetricsServiceRequest,
    ExportMetricsServiceResponse, ExportTracesServiceRequest, ExportTracesServiceResponse,
    KeyValue, LogRecord, Metric, NumberDataPoint, Resource, ResourceLogs, ResourceMetrics,
    ResourceSpans, Span, StatusMessage,
};
use telemetry_endpoint::scrape::{NoopConsumer, StaticScrapeProvider};
use telemetry_endpoint::ApiServer;

mod common;

fn traces_request() -> ExportTracesServiceRequest {
    ExportTracesServiceRequest {
        resource_spans: vec![ResourceSpans {
            resource: Some(Resource {
                attributes: vec![KeyValue {
                    key: "service.name".to_string(),
                    value: "checkout".to_string(),
                }],
            }),
            spans: vec![Span {
                trace_id: "0af7651916cd43dd8448eb211c80319c".to_string(),
                span_id: "b7ad6b7169203331".to_string(),
                parent_span_id: String::new(),
                name: "GET /cart".to_string(),
                start_time_unix_nano: 1_000,
                end_time_unix_nano: 2_000,
                attributes: vec![],
            }],
        }],
    }
}

#[tokio::test]
async fn json_export_round_trips_and_mirrors_content_type() {
    let (server, addr) = common::start_server().await;

    let resp = reqwest::Client::new()
        .post(common::url(addr, "/v1/traces"))
        .header("content-type", "application/json")
        .body(serde_json::to_vec(&traces_request()).unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("application/json")
    );
    let body: ExportTracesServiceResponse =
        serde_json::from_slice(&resp.bytes().await.unwrap()).unwrap();
    assert!(body.partial_success.is_none());

    server.shutdown(Duration::from_secs(2)).await.unwrap();
}

#[tokio::test]
async fn protobuf_export_round_trips() {
    let (server, addr) = common::start_server().await;

    let request = ExportMetricsServiceRequest {
        resource_metrics: vec![ResourceMetrics {
            resource: None,
            metrics: vec![Metric {
                name: "http_requests_total".to_string(),
                description: String::new(),
                unit: "1".to_string(),
                data_points: vec![NumberDataPoint {
                    time_unix_nano: 42,
                    value: 7.0,
                    attributes: vec![],
                }],
            }],
        }],
    };

    let resp = reqwest::Client::new()
        .post(common::url(addr, "/v1/metrics"))
        .header("content-type", "application/x-protobuf")
        .body(request.encode_to_vec())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("application/x-protobuf")
    );
    let body = ExportMetricsServiceResponse::decode(&resp.bytes().await.unwrap()[..]).unwrap();
    assert!(body.partial_success.is_none());

    server.shutdown(Duration::from_secs(2)).await.unwrap();
}

// The msgpack content type deliberately resolves through the JSON codec;
// this test pins the JSON-compatible subset behavior rather than real
// msgpack framing.
#[tokio::test]
async fn msgpack_content_type_uses_the_json_compatible_subset() {
    let (server, addr) = common::start_server().await;

    let request = telemetry_endpoint::pdata::ExportLogsServiceRequest {
        resource_logs: vec![ResourceLogs {
            resource: None,
            records: vec![LogRecord {
                time_unix_nano: 9,
                severity_text: "WARN".to_string(),
                body: "disk almost full".to_string(),
                attributes: vec![],
            }],
        }],
    };

    let resp = reqwest::Client::new()
        .post(common::url(addr, "/v1/logs"))
        .header("content-type", "application/x-msgpack")
        .body(serde_json::to_vec(&request).unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("application/x-msgpack")
    );
    let body: ExportLogsServiceResponse =
        serde_json::from_slice(&resp.bytes().await.unwrap()).unwrap();
    assert!(body.partial_success.is_none());

    server.shutdown(Duration::from_secs(2)).await.unwrap();
}

#[tokio::test]
async fn content_type_parameters_are_stripped_before_matching() {
    let (server, addr) = common::start_server().await;

    let resp = reqwest::Client::new()
        .post(common::url(addr, "/v1/traces"))
        .header("content-type", "Application/JSON; charset=utf-8")
        .body(serde_json::to_vec(&traces_request()).unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    server.shutdown(Duration::from_secs(2)).await.unwrap();
}

#[tokio::test]
async fn unknown_content_type_is_rejected_with_an_error_envelope() {
    let (server, addr) = common::start_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(common::url(addr, "/v1/traces"))
        .header("content-type", "text/plain")
        .body("hello")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 415);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "error");
    assert_eq!(body["errorType"], "not_acceptable");

    // The server survives the rejection.
    let resp = client
        .get(common::api_url(addr, "/status/buildinfo"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    server.shutdown(Duration::from_secs(2)).await.unwrap();
}

#[tokio::test]
async fn malformed_body_is_a_400_status_message() {
    let (server, addr) = common::start_server().await;

    let resp = reqwest::Client::new()
        .post(common::url(addr, "/v1/traces"))
        .header("content-type", "application/json")
        .body("{not valid json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let status: StatusMessage = serde_json::from_slice(&resp.bytes().await.unwrap()).unwrap();
    assert_eq!(status.code, 400);
    assert!(status.message.contains("failed to decode"));
    assert_eq!(status.details, vec!["bad_data".to_string()]);

    server.shutdown(Duration::from_secs(2)).await.unwrap();
}

#[tokio::test]
async fn malformed_protobuf_body_is_a_400_protobuf_status() {
    let (server, addr) = common::start_server().await;

    let resp = reqwest::Client::new()
        .post(common::url(addr, "/v1/metrics"))
        .header("content-type", "application/x-protobuf")
        .body(vec![0xff, 0xff, 0xff, 0xff])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    assert_eq!(
        resp.headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("application/x-protobuf")
    );
    let status = StatusMessage::decode(&resp.bytes().await.unwrap()[..]).unwrap();
    assert_eq!(status.code, 400);

    server.shutdown(Duration::from_secs(2)).await.unwrap();
}

/// An encoder whose response marshaling always fails, so tests can drive
/// the 500 path that the shipped encoders never take. With
/// `status_also_fails` the StatusMessage body fails too, forcing the
/// plain-text fallback.
struct BrokenResponseEncoder {
    status_also_fails: bool,
}

fn marshal_failure() -> CodecError {
    CodecError::Encode {
        content_type: "application/json",
        source: "synthetic marshal failure".into(),
    }
}

impl Encoder for BrokenResponseEncoder {
    fn unmarshal_traces_request(
        &self,
        _buf: &[u8],
    ) -> Result<ExportTracesServiceRequest, CodecError> {
        Ok(ExportTracesServiceRequest::default())
    }

    fn unmarshal_metrics_request(
        &self,
        _buf: &[u8],
    ) -> Result<ExportMetricsServiceRequest, CodecError> {
        Ok(ExportMetricsServiceRequest::default())
    }

    fn unmarshal_logs_request(&self, _buf: &[u8]) -> Result<ExportLogsServiceRequest, CodecError> {
        Ok(ExportLogsServiceRequest::default())
    }

    fn marshal_traces_response(
        &self,
        _resp: &ExportTracesServiceResponse,
    ) -> Result<Vec<u8>, CodecError> {
        Err(marshal_failure())
    }

    fn marshal_metrics_response(
        &self,
        _resp: &ExportMetricsServiceResponse,
    ) -> Result<Vec<u8>, CodecError> {
        Err(marshal_failure())
    }

    fn marshal_logs_response(
        &self,
        _resp: &ExportLogsServiceResponse,
    ) -> Result<Vec<u8>, CodecError> {
        Err(marshal_failure())
    }

    fn marshal_status(&self, status: &StatusMessage) -> Result<Vec<u8>, CodecError> {
        if self.status_also_fails {
            return Err(marshal_failure());
        }
        serde_json::to_vec(status).map_err(|e| CodecError::Encode {
            content_type: "application/json",
            source: Box::new(e),
        })
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }
}

async fn start_with_registry(codecs: CodecRegistry) -> (ApiServer, SocketAddr) {
    let server = ApiServer::new(
        common::ephemeral_config(),
        ConfigSnapshot::default(),
        Arc::new(StaticScrapeProvider::sample()),
        Arc::new(NoopConsumer),
        codecs,
        &PrometheusBuilder::new().build_recorder(),
    );
    server.start().await.expect("server should start");
    let addr = server.local_addr().expect("bound address");
    (server, addr)
}

#[tokio::test]
async fn encode_failure_is_a_500_status_message() {
    let registry = CodecRegistry::new(vec![Arc::new(BrokenResponseEncoder {
        status_also_fails: false,
    })]);
    let (server, addr) = start_with_registry(registry).await;

    let resp = reqwest::Client::new()
        .post(common::url(addr, "/v1/traces"))
        .header("content-type", "application/json")
        .body(serde_json::to_vec(&traces_request()).unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);
    let status: StatusMessage = serde_json::from_slice(&resp.bytes().await.unwrap()).unwrap();
    assert_eq!(status.code, 500);
    assert!(status.message.contains("failed to encode"));
    assert_eq!(status.details, vec!["internal".to_string()]);

    server.shutdown(Duration::from_secs(2)).await.unwrap();
}

#[tokio::test]
async fn encode_failure_falls_back_to_plain_text_when_status_marshaling_breaks() {
    let registry = CodecRegistry::new(vec![Arc::new(BrokenResponseEncoder {
        status_also_fails: true,
    })]);
    let (server, addr) = start_with_registry(registry).await;

    let resp = reqwest::Client::new()
        .post(common::url(addr, "/v1/logs"))
        .header("content-type", "application/json")
        .body("{}")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);
    let text = resp.text().await.unwrap();
    assert!(text.contains("failed to encode"));

    server.shutdown(Duration::from_secs(2)).await.unwrap();
}
