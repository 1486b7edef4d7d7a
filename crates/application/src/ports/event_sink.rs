//! Session notification port

use peach_domain::SessionEvent;

/// Publish side of the `login`/`logout` notification channels.
pub trait EventSink: Send + Sync {
    /// Publishes a notification to all current subscribers.
    fn publish(&self, event: SessionEvent);
}
