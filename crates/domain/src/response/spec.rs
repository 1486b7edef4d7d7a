//! Normalized response type

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{RawResponse, StatusCode};

/// A response as seen after normalization.
///
/// `data` starts as the parsed body and may be replaced by its nested `data`
/// field; `original_data` always holds the body as received. `status` may be
/// corrected from an error code embedded in the body.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApiResponse {
    /// HTTP status code, possibly corrected
    pub status: u16,
    /// Effective payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Payload as received, before unwrapping
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_data: Option<Value>,
    /// Canonical error message, if the call failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    /// Creates a response with the given status and payload.
    #[must_use]
    pub fn new(status: u16, data: Option<Value>) -> Self {
        Self {
            status,
            original_data: data.clone(),
            data,
            error: None,
        }
    }

    /// Builds the initial view of a raw transport response.
    #[must_use]
    pub fn from_raw(raw: &RawResponse) -> Self {
        Self::new(raw.status, raw.parse_data())
    }

    /// Returns the status as a `StatusCode`.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        StatusCode::new(self.status)
    }

    /// Returns true if no error was detected and the status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error.is_none() && self.status_code().is_success()
    }
}
