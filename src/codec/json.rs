//! JSON encoder.

use crate::codec::{CodecError, Encoder, JSON_CONTENT_TYPE};
use crate::pdata::{
    ExportLogsServiceRequest, ExportLogsServiceResponse, ExportMetricsServiceRequest,
    ExportMetricsServiceResponse, ExportTracesServiceRequest, ExportTracesServiceResponse,
    StatusMessage,
};

/// Encoder for `application/json` payloads.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonEncoder;

fn decode<T: serde::de::DeserializeOwned>(buf: &[u8]) -> Result<T, CodecError> {
    serde_json::from_slice(buf).map_err(|e| CodecError::Decode {
        content_type: JSON_CONTENT_TYPE,
        source: Box::new(e),
    })
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(value).map_err(|e| CodecError::Encode {
        content_type: JSON_CONTENT_TYPE,
        source: Box::new(e),
    })
}

impl Encoder for JsonEncoder {
    fn unmarshal_traces_request(
        &self,
        buf: &[u8],
    ) -> Result<ExportTracesServiceRequest, CodecError> {
        decode(buf)
    }

    fn unmarshal_metrics_request(
        &self,
        buf: &[u8],
    ) -> Result<ExportMetricsServiceRequest, CodecError> {
        decode(buf)
    }

    fn unmarshal_logs_request(&self, buf: &[u8]) -> Result<ExportLogsServiceRequest, CodecError> {
        decode(buf)
    }

    fn marshal_traces_response(
        &self,
        resp: &ExportTracesServiceResponse,
    ) -> Result<Vec<u8>, CodecError> {
        encode(resp)
    }

    fn marshal_metrics_response(
        &self,
        resp: &ExportMetricsServiceResponse,
    ) -> Result<Vec<u8>, CodecError> {
        encode(resp)
    }

    fn marshal_logs_response(
        &self,
        resp: &ExportLogsServiceResponse,
    ) -> Result<Vec<u8>, CodecError> {
        encode(resp)
    }

    fn marshal_status(&self, status: &StatusMessage) -> Result<Vec<u8>, CodecError> {
        encode(status)
    }

    fn content_type(&self) -> &'static str {
        JSON_CONTENT_TYPE
    }
}
