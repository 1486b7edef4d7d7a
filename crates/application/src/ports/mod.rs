//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the client core and the systems it
//! does not own: the HTTP transport, the persisted state container and the
//! notification channel. Adapters live in the infrastructure crate.

mod event_sink;
mod http_transport;
mod state_store;

pub use event_sink::EventSink;
pub use http_transport::{HttpTransport, TransportError};
pub use state_store::{StateStore, StoreError};
