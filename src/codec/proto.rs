//! Protobuf encoder.

use prost::Message;

use crate::codec::{CodecError, Encoder, PB_CONTENT_TYPE};
use crate::pdata::{
    ExportLogsServiceRequest, ExportLogsServiceResponse, ExportMetricsServiceRequest,
    ExportMetricsServiceResponse, ExportTracesServiceRequest, ExportTracesServiceResponse,
    StatusMessage,
};

/// Encoder for `application/x-protobuf` payloads.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProtobufEncoder;

fn decode<T: Message + Default>(buf: &[u8]) -> Result<T, CodecError> {
    T::decode(buf).map_err(|e| CodecError::Decode {
        content_type: PB_CONTENT_TYPE,
        source: Box::new(e),
    })
}

impl Encoder for ProtobufEncoder {
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
        Ok(resp.encode_to_vec())
    }

    fn marshal_metrics_response(
        &self,
        resp: &ExportMetricsServiceResponse,
    ) -> Result<Vec<u8>, CodecError> {
        Ok(resp.encode_to_vec())
    }

    fn marshal_logs_response(
        &self,
        resp: &ExportLogsServiceResponse,
    ) -> Result<Vec<u8>, CodecError> {
        Ok(resp.encode_to_vec())
    }

    fn marshal_status(&self, status: &StatusMessage) -> Result<Vec<u8>, CodecError> {
        Ok(status.encode_to_vec())
    }

    fn content_type(&self) -> &'static str {
        PB_CONTENT_TYPE
    }
}
