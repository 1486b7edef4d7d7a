//! Persisted session model and its lifecycle notifications.

mod event;
mod patch;
mod phase;
mod state;
mod stream_ref;

pub use event::SessionEvent;
pub use patch::SessionPatch;
pub use phase::SessionPhase;
pub use state::{SessionState, StreamGrant};
pub use stream_ref::StreamRef;
