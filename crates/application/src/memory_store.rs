//! In-memory session state container.
//!
//! Holds the session behind a tokio `RwLock`; every `set` is applied under
//! one write guard. The file-backed store in the infrastructure crate wraps
//! this type and adds durability.

use std::sync::Arc;

use async_trait::async_trait;
use peach_domain::{SessionPatch, SessionState};
use tokio::sync::RwLock;

use crate::ports::{StateStore, StoreError};

/// Thread-safe in-memory state store.
#[derive(Debug, Clone)]
pub struct MemoryStateStore {
    namespace: Arc<str>,
    state: Arc<RwLock<SessionState>>,
}

impl MemoryStateStore {
    /// Creates an empty store under the given namespace.
    #[must_use]
    pub fn new(namespace: impl Into<String>) -> Self {
        Self::with_state(namespace, SessionState::default())
    }

    /// Creates a store seeded with an existing session.
    #[must_use]
    pub fn with_state(namespace: impl Into<String>, state: SessionState) -> Self {
        Self {
            namespace: Arc::from(namespace.into()),
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Returns a snapshot without going through the port.
    pub async fn snapshot(&self) -> SessionState {
        self.state.read().await.clone()
    }

    /// Applies a patch and returns the resulting snapshot.
    pub async fn apply(&self, patch: SessionPatch) -> SessionState {
        let mut state = self.state.write().await;
        state.apply(patch);
        state.clone()
    }

    /// Replaces the whole session.
    pub async fn replace(&self, state: SessionState) {
        *self.state.write().await = state;
    }
}

impl Default for MemoryStateStore {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_NAMESPACE)
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn get(&self) -> Result<SessionState, StoreError> {
        Ok(self.snapshot().await)
    }

    async fn set(&self, patch: SessionPatch) -> Result<SessionState, StoreError> {
        Ok(self.apply(patch).await)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_set_returns_updated_snapshot() {
        let store = MemoryStateStore::new("test");
        let state = store.set(SessionPatch::new().token("t1")).await.unwrap();
        assert_eq!(state.token.as_deref(), Some("t1"));
        assert_eq!(store.get().await.unwrap(), state);
        assert_eq!(store.namespace(), "test");
    }

    #[tokio::test]
    async fn test_concurrent_patches_do_not_lose_fields() {
        let store = MemoryStateStore::default();
        let a = store.clone();
        let b = store.clone();
        let (left, right) = tokio::join!(
            async move { a.set(SessionPatch::new().token("t")).await },
            async move { b.set(SessionPatch::new().id("u1")).await },
        );
        left.unwrap();
        right.unwrap();

        let state = store.get().await.unwrap();
        assert_eq!(state.token.as_deref(), Some("t"));
        assert_eq!(state.id.as_deref(), Some("u1"));
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = MemoryStateStore::default();
        let clone = store.clone();
        clone.replace(SessionState {
            email: Some("a@b.c".to_string()),
            ..SessionState::default()
        })
        .await;
        assert_eq!(store.snapshot().await.email.as_deref(), Some("a@b.c"));
    }
}
