//! Session state container port

use async_trait::async_trait;
use peach_domain::{SessionPatch, SessionState};

/// Errors that can occur while reading or persisting session state.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// No location is available to persist state.
    #[error("Could not determine data directory")]
    NoDataDir,
}

/// Container holding one client's persisted session.
///
/// Each `set` is a single atomic read-modify-write, so concurrent calls
/// funnel every mutation through the store and never lose each other's
/// fields.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Namespace the state is persisted under.
    fn namespace(&self) -> &str;

    /// Returns a snapshot of the current state.
    async fn get(&self) -> Result<SessionState, StoreError>;

    /// Applies a partial update and returns the resulting snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the update could not be persisted. The in-memory
    /// view may already reflect the update.
    async fn set(&self, patch: SessionPatch) -> Result<SessionState, StoreError>;
}
