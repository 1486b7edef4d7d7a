//! Peach Domain - Core client types
//!
//! This crate defines the domain model for the Peach API client:
//! outgoing requests, normalized responses, and the persisted session.
//! All types here are pure Rust with no I/O dependencies.

pub mod error;
pub mod request;
pub mod response;
pub mod session;
pub mod value;

pub use error::{DomainError, DomainResult};
pub use request::{ApiRequest, Header, Headers, HttpMethod, RequestBody};
pub use response::{ApiResponse, DEFAULT_ERROR_STATUS, ErrorRepr, RawResponse, StatusCode};
pub use session::{SessionEvent, SessionPatch, SessionPhase, SessionState, StreamGrant, StreamRef};
pub use value::is_truthy;
