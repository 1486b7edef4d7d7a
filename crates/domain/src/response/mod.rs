//! Response types: raw transport output and the normalized API view.

mod error_repr;
mod raw;
mod spec;
mod status;

pub use error_repr::{DEFAULT_ERROR_STATUS, ErrorRepr};
pub use raw::RawResponse;
pub use spec::ApiResponse;
pub use status::StatusCode;
