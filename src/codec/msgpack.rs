//! Msgpack encoder.
//!
//! Msgpack payloads resolve through the JSON codec for now: clients on
//! this content type send the JSON-compatible subset, so the wrapper only
//! reports a different identity while delegating the actual
//! unmarshal/marshal work. This is a deliberate fidelity compromise, not
//! a general guarantee.

use crate::codec::{CodecError, Encoder, JsonEncoder, MSGPACK_CONTENT_TYPE};
use crate::pdata::{
    ExportLogsServiceRequest, ExportLogsServiceResponse, ExportMetricsServiceRequest,
    ExportMetricsServiceResponse, ExportTracesServiceRequest, ExportTracesServiceResponse,
    StatusMessage,
};

/// Encoder for `application/x-msgpack` payloads, delegating to the JSON
/// logic for its wire-compatible subset.
#[derive(Debug, Default, Clone, Copy)]
pub struct MsgpackEncoder {
    inner: JsonEncoder,
}

impl Encoder for MsgpackEncoder {
    fn unmarshal_traces_request(
        &self,
        buf: &[u8],
    ) -> Result<ExportTracesServiceRequest, CodecError> {
        self.inner.unmarshal_traces_request(buf)
    }

    fn unmarshal_metrics_request(
        &self,
        buf: &[u8],
    ) -> Result<ExportMetricsServiceRequest, CodecError> {
        self.inner.unmarshal_metrics_request(buf)
    }

    fn unmarshal_logs_request(&self, buf: &[u8]) -> Result<ExportLogsServiceRequest, CodecError> {
        self.inner.unmarshal_logs_request(buf)
    }

    fn marshal_traces_response(
        &self,
        resp: &ExportTracesServiceResponse,
    ) -> Result<Vec<u8>, CodecError> {
        self.inner.marshal_traces_response(resp)
    }

    fn marshal_metrics_response(
        &self,
        resp: &ExportMetricsServiceResponse,
    ) -> Result<Vec<u8>, CodecError> {
        self.inner.marshal_metrics_response(resp)
    }

    fn marshal_logs_response(
        &self,
        resp: &ExportLogsServiceResponse,
    ) -> Result<Vec<u8>, CodecError> {
        self.inner.marshal_logs_response(resp)
    }

    fn marshal_status(&self, status: &StatusMessage) -> Result<Vec<u8>, CodecError> {
        self.inner.marshal_status(status)
    }

    fn content_type(&self) -> &'static str {
        MSGPACK_CONTENT_TYPE
    }
}
