//! Wire-format codecs for telemetry export payloads.
//!
//! # Responsibilities
//! - Define the [`Encoder`] strategy: decode export requests and encode
//!   export responses/status messages for one content type
//! - Map content-type identifiers to encoders via an explicit, immutable
//!   [`CodecRegistry`] built once at composition time
//! - Keep decode failures distinguishable from encode failures so the HTTP
//!   layer can answer 400 vs 500

pub mod json;
pub mod msgpack;
pub mod proto;

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::pdata::{
    ExportLogsServiceRequest, ExportLogsServiceResponse, ExportMetricsServiceRequest,
    ExportMetricsServiceResponse, ExportTracesServiceRequest, ExportTracesServiceResponse,
    StatusMessage,
};

pub use json::JsonEncoder;
pub use msgpack::MsgpackEncoder;
pub use proto::ProtobufEncoder;

pub const PB_CONTENT_TYPE: &str = "application/x-protobuf";
pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const MSGPACK_CONTENT_TYPE: &str = "application/x-msgpack";

/// Errors raised by encoders.
///
/// `Decode` means the request bytes were not well-formed for the claimed
/// content type and maps to a 4xx. `Encode` only occurs on invariant
/// violations in a response value and maps to a 5xx.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to decode {content_type} request body: {source}")]
    Decode {
        content_type: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("failed to encode {content_type} response body: {source}")]
    Encode {
        content_type: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl CodecError {
    pub fn is_decode(&self) -> bool {
        matches!(self, CodecError::Decode { .. })
    }
}

/// Stateless strategy converting between raw wire bytes and the canonical
/// export request/response types for one content type. Implementations
/// hold no mutable state and are safe for unbounded concurrent use.
pub trait Encoder: Send + Sync {
    fn unmarshal_traces_request(
        &self,
        buf: &[u8],
    ) -> Result<ExportTracesServiceRequest, CodecError>;
    fn unmarshal_metrics_request(
        &self,
        buf: &[u8],
    ) -> Result<ExportMetricsServiceRequest, CodecError>;
    fn unmarshal_logs_request(&self, buf: &[u8]) -> Result<ExportLogsServiceRequest, CodecError>;

    fn marshal_traces_response(
        &self,
        resp: &ExportTracesServiceResponse,
    ) -> Result<Vec<u8>, CodecError>;
    fn marshal_metrics_response(
        &self,
        resp: &ExportMetricsServiceResponse,
    ) -> Result<Vec<u8>, CodecError>;
    fn marshal_logs_response(
        &self,
        resp: &ExportLogsServiceResponse,
    ) -> Result<Vec<u8>, CodecError>;

    /// Serialize the generic error/success envelope. Used uniformly across
    /// content types so clients parsing error bodies need not special-case
    /// the signal.
    fn marshal_status(&self, status: &StatusMessage) -> Result<Vec<u8>, CodecError>;

    /// Canonical MIME identifier, used for registry lookup and for the
    /// `Content-Type` response header.
    fn content_type(&self) -> &'static str;
}

/// Immutable mapping from content type to encoder.
///
/// The set of supported formats is fixed at composition time; there is no
/// runtime registration.
pub struct CodecRegistry {
    encoders: HashMap<&'static str, Arc<dyn Encoder>>,
}

impl CodecRegistry {
    pub fn new(encoders: Vec<Arc<dyn Encoder>>) -> Self {
        let encoders = encoders
            .into_iter()
            .map(|e| (e.content_type(), e))
            .collect();
        Self { encoders }
    }

    /// The registry with all built-in encoders: protobuf, JSON, and the
    /// JSON-delegating msgpack wrapper.
    pub fn with_defaults() -> Self {
        Self::new(vec![
            Arc::new(ProtobufEncoder),
            Arc::new(JsonEncoder),
            Arc::new(MsgpackEncoder::default()),
        ])
    }

    /// Look up the encoder for a `Content-Type` header value.
    ///
    /// Matching is exact on the bare MIME type: parameters such as charset
    /// are stripped and the comparison is case-insensitive.
    pub fn get(&self, content_type: &str) -> Option<&Arc<dyn Encoder>> {
        self.encoders.get(normalize(content_type).as_str())
    }

    pub fn content_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.encoders.keys().copied()
    }
}

/// Strip MIME parameters and lowercase the bare type.
fn normalize(header: &str) -> String {
    header
        .split(';')
        .next()
        .unwrap_or(header)
        .trim()
        .to_ascii_lowercase()
}
