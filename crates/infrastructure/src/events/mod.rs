//! In-process `login`/`logout` notification bus.

use peach_application::ports::EventSink;
use peach_domain::SessionEvent;
use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 16;

/// Broadcasts session notifications to every subscriber.
///
/// Publishing with no subscribers is not an error; the event is dropped.
#[derive(Debug, Clone)]
pub struct BroadcastEventBus {
    tx: broadcast::Sender<SessionEvent>,
}

impl BroadcastEventBus {
    /// Creates a bus with the default buffer size.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a bus buffering up to `capacity` events per slow subscriber.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribes to notifications published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for BroadcastEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for BroadcastEventBus {
    fn publish(&self, event: SessionEvent) {
        let channel = event.name();
        match self.tx.send(event) {
            Ok(receivers) => tracing::debug!(channel, receivers, "session event published"),
            Err(_) => tracing::trace!(channel, "session event dropped, no subscribers"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use peach_domain::SessionState;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_every_subscriber_receives() {
        let bus = BroadcastEventBus::new();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        bus.publish(SessionEvent::Logout);

        assert_eq!(a.recv().await.unwrap(), SessionEvent::Logout);
        assert_eq!(b.recv().await.unwrap(), SessionEvent::Logout);
    }

    #[tokio::test]
    async fn test_login_payload_is_delivered() {
        let bus = BroadcastEventBus::new();
        let mut rx = bus.subscribe();
        let state = SessionState {
            token: Some("T".to_string()),
            ..SessionState::default()
        };

        bus.publish(SessionEvent::login(state.clone()));

        assert_eq!(rx.recv().await.unwrap(), SessionEvent::login(state));
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = BroadcastEventBus::new();
        bus.publish(SessionEvent::Logout);
        assert_eq!(bus.subscriber_count(), 0);
    }
}
