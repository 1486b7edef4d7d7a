//! Request specification type

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::{Headers, HttpMethod, RequestBody};

/// A single outgoing API call.
///
/// Built by the dispatcher, mutated in place by the request augmenter, then
/// handed to the transport. `original_body` keeps the structured body after
/// serialization so the response normalizer can echo submitted credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiRequest {
    /// Unique identifier for this call, used for log correlation
    pub id: Uuid,
    /// HTTP method
    pub method: HttpMethod,
    /// Target URL, including the API root
    pub url: String,
    /// HTTP headers
    #[serde(default)]
    pub headers: Headers,
    /// Request body
    #[serde(default)]
    pub body: RequestBody,
    /// Structured body as supplied by the caller, before serialization
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_body: Option<Value>,
}

impl ApiRequest {
    /// Creates a request without a body.
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            method,
            url: url.into(),
            headers: Headers::new(),
            body: RequestBody::None,
            original_body: None,
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    /// Creates a POST request.
    #[must_use]
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    /// Sets the request body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Returns the value of the Authorization header, if set.
    #[must_use]
    pub fn authorization(&self) -> Option<&str> {
        self.headers.get("Authorization")
    }
}
