//! Stream and profile fetches backed by the session cache.

use peach_domain::{HttpMethod, SessionPatch, StreamRef, is_truthy};
use serde_json::Value;

use super::PeachClient;
use super::dispatcher::path_param;
use crate::error::{ClientError, ClientResult};

impl PeachClient {
    /// Fetches a user's stream, serving it from the session cache when a
    /// previous fetch succeeded.
    ///
    /// `"me"` (or [`StreamRef::Me`]) resolves to the stored user id.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotAuthenticated`] for `me` without a stored
    /// id, otherwise the API or transport error.
    pub async fn user_stream(&self, stream: impl Into<StreamRef>) -> ClientResult<Value> {
        let stream = stream.into();
        let state = self.store.get().await?;
        let stream_id = stream
            .resolve(state.id.as_deref())
            .ok_or(ClientError::NotAuthenticated)?
            .to_string();

        if let Some(cached) = state.cached_stream(&stream_id) {
            tracing::debug!(stream_id = %stream_id, "stream served from cache");
            return Ok(cached.clone());
        }

        let encoded = path_param("stream id", &stream_id)?;
        let body = self
            .request(HttpMethod::Get, &format!("/stream/id/{encoded}"), None)
            .await?;

        if is_truthy(&body) {
            self.store
                .set(SessionPatch::new().cache_stream(stream_id, body.clone()))
                .await?;
        }
        Ok(body)
    }

    /// Fetches the user's own profile, cached after the first success.
    ///
    /// # Errors
    ///
    /// See [`PeachClient::user_stream`].
    pub async fn me(&self) -> ClientResult<Value> {
        if let Some(profile) = self.store.get().await?.cached_profile() {
            return Ok(profile.clone());
        }

        let profile = self.user_stream(StreamRef::Me).await?;
        if is_truthy(&profile) {
            self.store
                .set(SessionPatch::new().profile(profile.clone()))
                .await?;
        }
        Ok(profile)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::client::tests::harness;
    use peach_domain::SessionState;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn signed_in() -> SessionState {
        SessionState {
            id: Some("u1".to_string()),
            token: Some("T".to_string()),
            ..SessionState::default()
        }
    }

    #[tokio::test]
    async fn test_second_fetch_is_cached() {
        let h = harness(signed_in());
        h.transport.push_json(
            200,
            &json!({ "success": 1, "data": { "id": "u2", "posts": [] } }),
        );

        let first = h.client.user_stream("u2").await.unwrap();
        let second = h.client.user_stream("u2").await.unwrap();

        assert_eq!(first, json!({ "id": "u2", "posts": [] }));
        assert_eq!(first, second);
        assert_eq!(h.transport.call_count(), 1);
        assert_eq!(h.transport.last_request().unwrap().url, "/api/stream/id/u2");
    }

    #[tokio::test]
    async fn test_me_resolves_to_stored_id() {
        let h = harness(signed_in());
        h.transport
            .push_json(200, &json!({ "success": 1, "data": { "id": "u1" } }));

        h.client.user_stream("me").await.unwrap();

        assert_eq!(h.transport.last_request().unwrap().url, "/api/stream/id/u1");
        assert!(h.store.snapshot().await.cached_stream("u1").is_some());
    }

    #[tokio::test]
    async fn test_me_without_id_fails() {
        let h = harness(SessionState::default());

        let err = h.client.me().await.unwrap_err();

        assert!(matches!(err, ClientError::NotAuthenticated));
        assert_eq!(h.transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let h = harness(signed_in());
        h.transport.push_json(500, &json!({ "error": "boom" }));
        h.transport
            .push_json(200, &json!({ "success": 1, "data": { "id": "u3" } }));

        assert!(h.client.user_stream("u3").await.is_err());
        h.client.user_stream("u3").await.unwrap();

        assert_eq!(h.transport.call_count(), 2);
    }

    #[tokio::test]
    async fn test_profile_cached_after_first_success() {
        let h = harness(signed_in());
        h.transport
            .push_json(200, &json!({ "success": 1, "data": { "id": "u1", "name": "Jo" } }));

        let first = h.client.me().await.unwrap();
        let second = h.client.me().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(h.transport.call_count(), 1);
        assert_eq!(
            h.store.snapshot().await.profile,
            Some(json!({ "id": "u1", "name": "Jo" }))
        );
    }
}
