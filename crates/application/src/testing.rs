//! Test doubles for the client ports.
//!
//! Available to this crate's tests and, with the `testing` feature, to
//! downstream crates.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use peach_domain::{ApiRequest, RawResponse, SessionEvent};
use serde_json::Value;

use crate::ports::{EventSink, HttpTransport, TransportError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Transport that replays scripted responses and records every request.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<RawResponse, TransportError>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    /// Creates a transport with no scripted responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a JSON response.
    pub fn push_json(&self, status: u16, body: &Value) {
        lock(&self.responses).push_back(Ok(RawResponse::json(status, body)));
    }

    /// Queues a transport failure.
    pub fn push_error(&self, error: TransportError) {
        lock(&self.responses).push_back(Err(error));
    }

    /// Requests received so far, as dispatched.
    #[must_use]
    pub fn requests(&self) -> Vec<ApiRequest> {
        lock(&self.requests).clone()
    }

    /// Number of requests received so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// The most recent request, if any.
    #[must_use]
    pub fn last_request(&self) -> Option<ApiRequest> {
        lock(&self.requests).last().cloned()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<RawResponse, TransportError> {
        lock(&self.requests).push(request.clone());
        lock(&self.responses).pop_front().unwrap_or_else(|| {
            Err(TransportError::Other(format!(
                "no scripted response for {} {}",
                request.method, request.url
            )))
        })
    }
}

/// Event sink that records every published notification.
#[derive(Debug, Default)]
pub struct RecordingEvents {
    events: Mutex<Vec<SessionEvent>>,
}

impl RecordingEvents {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All notifications published so far.
    #[must_use]
    pub fn events(&self) -> Vec<SessionEvent> {
        lock(&self.events).clone()
    }

    /// Number of notifications published on the named channel.
    #[must_use]
    pub fn count(&self, channel: &str) -> usize {
        lock(&self.events)
            .iter()
            .filter(|e| e.name() == channel)
            .count()
    }
}

impl EventSink for RecordingEvents {
    fn publish(&self, event: SessionEvent) {
        lock(&self.events).push(event);
    }
}
