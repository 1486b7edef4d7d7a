//! Raw transport response.

use std::time::Duration;

use serde_json::Value;

use super::StatusCode;
use crate::request::Headers;

/// What the transport hands back before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: Headers,
    /// Response body bytes
    pub body: Vec<u8>,
    /// Time from dispatch until the body was read
    pub duration: Duration,
}

impl RawResponse {
    /// Creates a raw response.
    #[must_use]
    pub const fn new(status: u16, headers: Headers, body: Vec<u8>, duration: Duration) -> Self {
        Self {
            status,
            headers,
            body,
            duration,
        }
    }

    /// Creates a raw response carrying a JSON body.
    #[must_use]
    pub fn json(status: u16, body: &Value) -> Self {
        let mut headers = Headers::new();
        headers.set("Content-Type", "application/json");
        Self {
            status,
            headers,
            body: body.to_string().into_bytes(),
            duration: Duration::ZERO,
        }
    }

    /// Returns the status as a `StatusCode`.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        StatusCode::new(self.status)
    }

    /// Interprets the body.
    ///
    /// An empty body yields `None`. A body that parses as JSON yields that
    /// value; anything else is returned as a JSON string of its (lossy)
    /// UTF-8 text.
    #[must_use]
    pub fn parse_data(&self) -> Option<Value> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return None;
        }
        serde_json::from_slice(&self.body).map_or_else(
            |_| Some(Value::String(String::from_utf8_lossy(&self.body).into_owned())),
            Some,
        )
    }
}
