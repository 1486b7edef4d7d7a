//! The Peach API client.
//!
//! [`PeachClient`] owns the ports and runs every call through the same
//! pipeline: read session → augment request → transport → normalize
//! response → apply session effects → deliver `(error, data)` once.
//!
//! The operations themselves are split by concern:
//! - `dispatcher`: the endpoint table (verb + path per operation)
//! - `lifecycle`: login on startup, logout, logged-in predicate
//! - `cache`: stream and profile fetches backed by the session cache

mod cache;
mod dispatcher;
mod lifecycle;

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use peach_domain::{ApiRequest, ApiResponse, HttpMethod, SessionEvent, SessionState};
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::completion::Completion;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::pipeline::{SessionEffects, augment_request, normalize_response};
use crate::ports::{EventSink, HttpTransport, StateStore};

pub use dispatcher::{Credentials, PostContent, Registration};
pub use lifecycle::InitOutcome;

/// Client for the Peach social API.
///
/// Cheap to share behind an `Arc`; calls may run concurrently. All session
/// mutations go through the [`StateStore`] one patch at a time.
///
/// # Example
///
/// ```ignore
/// let client = PeachClient::connect(config, transport, store, events);
/// client.login(&Credentials::new("jo@example.com", "secret")).await?;
/// let friends = client.connections().await?;
/// ```
pub struct PeachClient {
    config: ClientConfig,
    transport: Arc<dyn HttpTransport>,
    store: Arc<dyn StateStore>,
    events: Arc<dyn EventSink>,
    logging_in: AtomicBool,
}

impl PeachClient {
    /// Creates a client. No request is issued.
    #[must_use]
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn StateStore>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            config,
            transport,
            store,
            events,
            logging_in: AtomicBool::new(false),
        }
    }

    /// Creates a shared client and, if `auto_init` is set, schedules the
    /// stored-credential login on the current tokio runtime.
    ///
    /// Without a running runtime the automatic login is skipped; call
    /// [`PeachClient::init`] manually instead.
    #[must_use]
    pub fn connect(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn StateStore>,
        events: Arc<dyn EventSink>,
    ) -> Arc<Self> {
        let client = Arc::new(Self::new(config, transport, store, events));
        if client.config.auto_init {
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    let delay = client.config.init_delay();
                    let task_client = Arc::clone(&client);
                    handle.spawn(async move {
                        tokio::time::sleep(delay).await;
                        if let Err(error) = task_client.init().await {
                            tracing::warn!(%error, "automatic session init failed");
                        }
                    });
                }
                Err(_) => {
                    tracing::warn!("no tokio runtime available, skipping automatic session init");
                }
            }
        }
        client
    }

    /// Client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The state store holding this client's session.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn StateStore> {
        &self.store
    }

    /// Returns a snapshot of the persisted session.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub async fn session(&self) -> ClientResult<SessionState> {
        Ok(self.store.get().await?)
    }

    /// Issues a call to an arbitrary endpoint path under the API root.
    ///
    /// # Errors
    ///
    /// See [`PeachClient::send`].
    pub async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
    ) -> ClientResult<Value> {
        let request = ApiRequest::new(method, self.config.endpoint(path)).with_body(body);
        self.send(request).await
    }

    /// Runs a request through the full pipeline.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Transport`] if no response was received
    /// - [`ClientError::Unauthorized`] on 401
    /// - [`ClientError::Api`] for failures reported in the body or status
    /// - [`ClientError::Store`] if session state could not be read or saved
    pub async fn send(&self, mut request: ApiRequest) -> ClientResult<Value> {
        let state = self.store.get().await?;
        augment_request(&mut request, &state);

        tracing::debug!(
            request_id = %request.id,
            method = %request.method,
            url = %request.url,
            authorized = request.authorization().is_some(),
            "dispatching request"
        );

        let raw = self.transport.execute(&request).await.map_err(|error| {
            tracing::warn!(request_id = %request.id, %error, "transport failure");
            ClientError::from(error)
        })?;

        let mut response = ApiResponse::from_raw(&raw);
        let state = self.store.get().await?;
        let effects = normalize_response(&mut response, &request, &state);

        tracing::debug!(
            request_id = %request.id,
            status = response.status,
            duration_ms = u64::try_from(raw.duration.as_millis()).unwrap_or(u64::MAX),
            error = response.error.as_deref(),
            "response received"
        );

        self.apply_effects(effects).await?;

        let success = response.status_code().is_success();
        match response.error {
            None if success => Ok(response.data.unwrap_or(Value::Null)),
            error => Err(ClientError::from_response(response.status, error)),
        }
    }

    /// Runs an operation on the tokio runtime and hands its result to a
    /// callback exactly once.
    pub fn spawn_call<T, Fut, Op, F>(self: &Arc<Self>, op: Op, callback: F) -> JoinHandle<()>
    where
        T: Send + 'static,
        Fut: Future<Output = ClientResult<T>> + Send + 'static,
        Op: FnOnce(Arc<Self>) -> Fut + Send + 'static,
        F: FnOnce(ClientResult<T>) + Send + 'static,
    {
        let client = Arc::clone(self);
        let mut completion = Completion::new(callback);
        tokio::spawn(async move {
            let result = op(client).await;
            completion.complete(result);
        })
    }

    async fn apply_effects(&self, effects: SessionEffects) -> ClientResult<()> {
        let mut latest = None;
        for patch in effects.patches {
            latest = Some(self.store.set(patch).await?);
        }

        if effects.login
            && let Some(state) = latest
        {
            tracing::info!(
                user_id = state.id.as_deref().unwrap_or("unknown"),
                token = %token_preview(state.token.as_deref().unwrap_or_default()),
                "session token updated"
            );
            self.events.publish(SessionEvent::login(state));
        }
        Ok(())
    }

    fn publish(&self, event: SessionEvent) {
        self.events.publish(event);
    }
}

impl std::fmt::Debug for PeachClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeachClient")
            .field("config", &self.config)
            .field("namespace", &self.store.namespace())
            .finish_non_exhaustive()
    }
}

/// Short, log-safe preview of a credential (first 8 chars + ...).
#[must_use]
pub fn token_preview(token: &str) -> String {
    if token.chars().count() > 12 {
        let head: String = token.chars().take(8).collect();
        format!("{head}...")
    } else {
        "***".to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
pub(crate) mod tests {
    use super::*;
    use crate::memory_store::MemoryStateStore;
    use crate::ports::TransportError;
    use crate::testing::{RecordingEvents, ScriptedTransport};
    use peach_domain::{SessionPatch, StreamGrant};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    pub(crate) struct Harness {
        pub client: Arc<PeachClient>,
        pub transport: Arc<ScriptedTransport>,
        pub store: MemoryStateStore,
        pub events: Arc<RecordingEvents>,
    }

    pub(crate) fn harness(state: SessionState) -> Harness {
        let transport = Arc::new(ScriptedTransport::new());
        let store = MemoryStateStore::with_state("test", state);
        let events = Arc::new(RecordingEvents::new());
        let client = Arc::new(PeachClient::new(
            ClientConfig::default().with_auto_init(false),
            Arc::clone(&transport) as Arc<dyn HttpTransport>,
            Arc::new(store.clone()),
            Arc::clone(&events) as Arc<dyn EventSink>,
        ));
        Harness {
            client,
            transport,
            store,
            events,
        }
    }

    #[tokio::test]
    async fn test_unauthorized_leaves_state_untouched() {
        let h = harness(SessionState {
            token: Some("T1".to_string()),
            ..SessionState::default()
        });
        let before = h.store.snapshot().await;
        h.transport
            .push_json(401, &json!({ "token": "T2", "streams": [{ "id": "x", "token": "y" }] }));

        let err = h.client.connections().await.unwrap_err();

        assert!(matches!(err, ClientError::Unauthorized));
        assert_eq!(h.store.snapshot().await, before);
        assert!(h.events.events().is_empty());
    }

    #[tokio::test]
    async fn test_new_token_publishes_login_once() {
        let h = harness(SessionState {
            token: Some("T1".to_string()),
            ..SessionState::default()
        });
        h.transport.push_json(
            200,
            &json!({ "success": 1, "data": { "token": "T2", "streams": [{ "id": "u1", "token": "s1" }] } }),
        );

        h.client
            .login(&Credentials::new("jo@example.com", "pw"))
            .await
            .unwrap();

        let state = h.store.snapshot().await;
        assert_eq!(state.token.as_deref(), Some("T2"));
        assert_eq!(state.id.as_deref(), Some("u1"));
        assert_eq!(state.stored_credentials(), Some(("jo@example.com", "pw")));

        let events = h.events.events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            SessionEvent::Login(snapshot) => assert_eq!(snapshot.token.as_deref(), Some("T2")),
            SessionEvent::Logout => panic!("expected login"),
        }
    }

    #[tokio::test]
    async fn test_transport_error_passes_through() {
        let h = harness(SessionState::default());
        h.transport
            .push_error(TransportError::Timeout { timeout_ms: 100 });

        let err = h.client.connections().await.unwrap_err();

        assert!(matches!(
            err,
            ClientError::Transport(TransportError::Timeout { timeout_ms: 100 })
        ));
        assert_eq!(h.store.snapshot().await, SessionState::default());
    }

    #[tokio::test]
    async fn test_success_zero_reports_corrected_status() {
        let h = harness(SessionState::default());
        h.transport.push_json(200, &json!({ "success": 0 }));

        let err = h.client.like("p1").await.unwrap_err();

        assert_eq!(err.to_string(), "Unspecified error");
        assert_eq!(err.status(), Some(520));
    }

    #[tokio::test]
    async fn test_error_status_without_body_error() {
        let h = harness(SessionState::default());
        h.transport.push_json(404, &json!({ "detail": "nope" }));

        let err = h.client.explore().await.unwrap_err();

        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "Not Found");
    }

    #[tokio::test]
    async fn test_scoped_token_reaches_transport() {
        let h = harness(SessionState {
            token: Some("session".to_string()),
            streams: vec![StreamGrant::new("u1", "scoped")],
            ..SessionState::default()
        });
        h.transport.push_json(200, &json!({ "success": 1, "data": {} }));

        h.client
            .set_visibility(json!({ "friendsOnly": true }))
            .await
            .unwrap();

        let sent = h.transport.last_request().unwrap();
        assert_eq!(sent.authorization(), Some("Bearer scoped"));
        assert_eq!(sent.url, "/api/stream/visibility");
    }

    #[tokio::test]
    async fn test_spawn_call_delivers_once() {
        let h = harness(SessionState::default());
        h.transport.push_json(200, &json!({ "success": 1, "data": { "connections": [] } }));
        let (tx, rx) = tokio::sync::oneshot::channel();

        h.client
            .spawn_call(
                |client| async move { client.connections().await },
                move |result| {
                    let _ = tx.send(result.is_ok());
                },
            )
            .await
            .unwrap();

        assert!(rx.await.unwrap());
        assert_eq!(h.transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_effects_apply_in_order() {
        let h = harness(SessionState::default());
        let effects = SessionEffects {
            patches: vec![SessionPatch::new().id("a"), SessionPatch::new().id("b")],
            login: false,
        };
        h.client.apply_effects(effects).await.unwrap();
        assert_eq!(h.store.snapshot().await.id.as_deref(), Some("b"));
    }

    #[test]
    fn test_token_preview_hides_short_tokens() {
        assert_eq!(token_preview("abcdefghijklmnop"), "abcdefgh...");
        assert_eq!(token_preview("short"), "***");
    }
}
