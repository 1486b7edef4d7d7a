//! The interceptor pair every call passes through.
//!
//! ```text
//! ApiRequest ──augment_request──► transport ──► ApiResponse ──normalize_response──► (error, data)
//!      ▲                                                              │
//!      └──────────── SessionState (read) ◄── SessionEffects (write) ◄─┘
//! ```
//!
//! Both functions are pure with respect to the store: the augmenter only
//! reads a snapshot, and the normalizer returns the mutations it wants
//! instead of performing them. The client applies those effects.

mod augment;
mod normalize;

pub use augment::{AUTHORIZATION, augment_request, scoped_stream_id};
pub use normalize::{SessionEffects, normalize_response};
