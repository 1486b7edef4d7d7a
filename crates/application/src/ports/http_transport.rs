//! HTTP transport port

use async_trait::async_trait;
use peach_domain::{ApiRequest, RawResponse};

/// Errors raised by the transport before a response was received.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The URL could not be parsed or resolved.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The request timed out.
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout {
        /// Timeout that was exceeded
        timeout_ms: u64,
    },

    /// The host name could not be resolved.
    #[error("DNS resolution failed for {host}: {message}")]
    DnsError {
        /// Host that failed to resolve
        host: String,
        /// Underlying message
        message: String,
    },

    /// The server refused the connection.
    #[error("Connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Target host
        host: String,
        /// Target port
        port: u16,
    },

    /// The connection failed for another reason.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Too many redirects were followed.
    #[error("Too many redirects (max {max})")]
    TooManyRedirects {
        /// Redirect limit
        max: usize,
    },

    /// The response body could not be read.
    #[error("Failed to read body: {0}")]
    Body(String),

    /// Any other transport failure.
    #[error("{0}")]
    Other(String),
}

/// Port for issuing HTTP requests.
///
/// Implementations send the request exactly as given: the client has
/// already attached credentials and serialized the body.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Executes a request and returns the raw response.
    ///
    /// # Errors
    ///
    /// Returns an error if no response could be obtained. Non-2xx statuses
    /// are not errors at this level.
    async fn execute(&self, request: &ApiRequest) -> Result<RawResponse, TransportError>;
}
