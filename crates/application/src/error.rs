//! Client error types

use peach_domain::{DomainError, StatusCode};
use thiserror::Error;

use crate::ports::{StoreError, TransportError};

/// Every failure an API operation can report.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The transport could not complete the call. No state was touched.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered 401; the body was not interpreted.
    #[error("Unauthorized")]
    Unauthorized,

    /// The server reported a failure in the body or through its status.
    #[error("{message}")]
    Api {
        /// Status code, corrected from the error payload when the server sent 200
        status: u16,
        /// Canonical error message
        message: String,
    },

    /// Stored credentials were rejected during initialization.
    #[error("Invalid credentials")]
    InvalidCredentials(#[source] Box<ClientError>),

    /// The operation needs the user's id but none is stored.
    #[error("not authenticated: no user id stored")]
    NotAuthenticated,

    /// An argument failed validation.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The state store failed to read or persist the session.
    #[error("state store error: {0}")]
    Store(#[from] StoreError),

    /// A request body could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Builds the error for a failed response.
    #[must_use]
    pub fn from_response(status: u16, message: Option<String>) -> Self {
        match message {
            Some(message) if status == StatusCode::UNAUTHORIZED.as_u16() && message == "Unauthorized" => {
                Self::Unauthorized
            }
            Some(message) => Self::Api { status, message },
            None => Self::Api {
                status,
                message: StatusCode::new(status).reason_phrase().to_string(),
            },
        }
    }

    /// HTTP status associated with this error, if it came from a response.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(StatusCode::UNAUTHORIZED.as_u16()),
            Self::Api { status, .. } => Some(*status),
            Self::InvalidCredentials(source) => source.status(),
            _ => None,
        }
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unauthorized_from_401() {
        let err = ClientError::from_response(401, Some("Unauthorized".to_string()));
        assert!(matches!(err, ClientError::Unauthorized));
        assert_eq!(err.to_string(), "Unauthorized");
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn test_api_error_keeps_message() {
        let err = ClientError::from_response(520, Some("Unspecified error".to_string()));
        assert_eq!(err.to_string(), "Unspecified error");
        assert_eq!(err.status(), Some(520));
    }

    #[test]
    fn test_bare_failure_uses_reason_phrase() {
        let err = ClientError::from_response(404, None);
        assert_eq!(err.to_string(), "Not Found");
    }

    #[test]
    fn test_invalid_credentials_display() {
        let err = ClientError::InvalidCredentials(Box::new(ClientError::Unauthorized));
        assert_eq!(err.to_string(), "Invalid credentials");
        assert_eq!(err.status(), Some(401));
    }
}
