//! Peach Infrastructure - Adapters for the client ports
//!
//! This crate provides the concrete implementations the CLI wires into
//! [`peach_application::PeachClient`]:
//! - [`ReqwestTransport`]: HTTP over reqwest
//! - [`FileStateStore`]: session persisted as JSON per namespace
//! - [`BroadcastEventBus`]: `login`/`logout` notifications over a tokio broadcast channel
//! - [`ConfigLoader`]: layered configuration (defaults, TOML file, environment)

pub mod adapters;
pub mod config;
pub mod events;
pub mod persistence;
pub mod serialization;

pub use adapters::ReqwestTransport;
pub use config::ConfigLoader;
pub use events::BroadcastEventBus;
pub use persistence::FileStateStore;
pub use serialization::{SerializationError, from_json_bytes, to_json_stable_bytes};
