//! Generic response envelope for the status/query API.
//!
//! Every route answers `{status, data, errorType?, error?, warnings?}` so
//! programmatic clients can branch on `status` and `errorType` without
//! parsing route-specific error shapes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// The envelope wrapping every status/query response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: ResponseStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(rename = "errorType", skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: ResponseStatus::Success,
            data: Some(data),
            error_type: None,
            error: None,
            warnings: Vec::new(),
        }
    }

    pub fn error(error_type: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            data: None,
            error_type: Some(error_type.into()),
            error: Some(error.into()),
            warnings: Vec::new(),
        }
    }
}

/// Stable `errorType` discriminators.
pub mod error_type {
    /// The request carried malformed input (bad selector, bad payload).
    pub const BAD_DATA: &str = "bad_data";
    /// The request asked for a representation the server cannot produce.
    pub const NOT_ACCEPTABLE: &str = "not_acceptable";
    /// An implementation bug surfaced while producing the response.
    pub const INTERNAL: &str = "internal";
}
