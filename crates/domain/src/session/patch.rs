//! Partial updates to the persisted session.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::StreamGrant;

/// Top-level fields a credential echo must never overwrite.
const RESERVED_FIELDS: &[&str] = &["id", "token", "streams", "streamCache", "profile"];

/// A partial update to [`SessionState`](super::SessionState).
///
/// Outer `None` leaves a field untouched; `Some(None)` clears it. Cached
/// streams and extra fields are merged into the existing maps.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionPatch {
    /// New user id
    pub id: Option<Option<String>>,
    /// New session token
    pub token: Option<Option<String>>,
    /// New stored email
    pub email: Option<Option<String>>,
    /// New stored password
    pub password: Option<Option<String>>,
    /// Replacement stream list
    pub streams: Option<Vec<StreamGrant>>,
    /// Stream cache entries to insert
    pub cached_streams: BTreeMap<String, Value>,
    /// New profile
    pub profile: Option<Option<Value>>,
    /// Other fields to merge
    pub extra: Map<String, Value>,
}

impl SessionPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if applying this patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Sets the user id.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(Some(id.into()));
        self
    }

    /// Sets the session token.
    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(Some(token.into()));
        self
    }

    /// Clears the session token.
    #[must_use]
    pub fn clear_token(mut self) -> Self {
        self.token = Some(None);
        self
    }

    /// Sets the stored email and password.
    #[must_use]
    pub fn credentials(mut self, email: impl Into<String>, password: impl Into<String>) -> Self {
        self.email = Some(Some(email.into()));
        self.password = Some(Some(password.into()));
        self
    }

    /// Replaces the stream list, keeping the first grant for each id.
    #[must_use]
    pub fn streams(mut self, streams: Vec<StreamGrant>) -> Self {
        let mut unique: Vec<StreamGrant> = Vec::with_capacity(streams.len());
        for grant in streams {
            if !unique.iter().any(|g| g.id == grant.id) {
                unique.push(grant);
            }
        }
        self.streams = Some(unique);
        self
    }

    /// Caches a fetched stream body.
    #[must_use]
    pub fn cache_stream(mut self, stream_id: impl Into<String>, body: Value) -> Self {
        self.cached_streams.insert(stream_id.into(), body);
        self
    }

    /// Sets the cached profile.
    #[must_use]
    pub fn profile(mut self, profile: Value) -> Self {
        self.profile = Some(Some(profile));
        self
    }

    /// Merges the fields of a submitted request body.
    ///
    /// String `email`/`password` become the stored credentials; other fields
    /// land in `extra`. Structural fields (`id`, `token`, `streams`, ...) are
    /// ignored so an echo can never clobber server-issued state.
    #[must_use]
    pub fn echo(mut self, body: &Value) -> Self {
        let Some(fields) = body.as_object() else {
            return self;
        };
        for (key, value) in fields {
            match (key.as_str(), value) {
                ("email", Value::String(email)) => self.email = Some(Some(email.clone())),
                ("password", Value::String(password)) => {
                    self.password = Some(Some(password.clone()));
                }
                ("email" | "password", _) => {}
                (key, _) if RESERVED_FIELDS.contains(&key) => {}
                (key, value) => {
                    self.extra.insert(key.to_string(), value.clone());
                }
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionState;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_empty_patch_is_noop() {
        let mut state = SessionState {
            token: Some("t".to_string()),
            ..SessionState::default()
        };
        let before = state.clone();
        assert!(SessionPatch::new().is_empty());
        state.apply(SessionPatch::new());
        assert_eq!(state, before);
    }

    #[test]
    fn test_clear_token_keeps_credentials() {
        let mut state = SessionState::default();
        state.apply(SessionPatch::new().token("t").credentials("a@b.c", "pw"));
        state.apply(SessionPatch::new().clear_token());
        assert_eq!(state.token, None);
        assert_eq!(state.stored_credentials(), Some(("a@b.c", "pw")));
    }

    #[test]
    fn test_streams_are_deduplicated() {
        let patch = SessionPatch::new().streams(vec![
            StreamGrant::new("s1", "a"),
            StreamGrant::new("s2", "b"),
            StreamGrant::new("s1", "c"),
        ]);
        let streams = patch.streams.unwrap_or_default();
        assert_eq!(streams.len(), 2);
        assert_eq!(streams[0].token.as_deref(), Some("a"));
    }

    #[test]
    fn test_echo_merges_submitted_fields() {
        let body = json!({
            "name": "Jo",
            "email": "jo@example.com",
            "password": "secret",
            "token": "forged",
            "streams": []
        });
        let mut state = SessionState::default();
        state.apply(SessionPatch::new().token("real").echo(&body));
        assert_eq!(state.token.as_deref(), Some("real"));
        assert_eq!(state.email.as_deref(), Some("jo@example.com"));
        assert_eq!(state.password.as_deref(), Some("secret"));
        assert_eq!(state.extra.get("name"), Some(&json!("Jo")));
        assert!(state.extra.get("streams").is_none());
    }

    #[test]
    fn test_cache_entries_merge() {
        let mut state = SessionState::default();
        state.apply(SessionPatch::new().cache_stream("a", json!({ "id": "a" })));
        state.apply(SessionPatch::new().cache_stream("b", json!({ "id": "b" })));
        assert_eq!(state.stream_cache.len(), 2);
    }
}
