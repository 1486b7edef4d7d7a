//! Peach Application - Request pipeline and session orchestration
//!
//! This crate holds the decision logic of the client:
//! - the request augmenter and response normalizer ([`pipeline`])
//! - the session lifecycle, stream cache and endpoint table ([`PeachClient`])
//! - the ports the client talks through ([`ports`])

pub mod client;
pub mod completion;
pub mod config;
pub mod error;
pub mod memory_store;
pub mod pipeline;
pub mod ports;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use client::{Credentials, InitOutcome, PeachClient, PostContent, Registration};
pub use completion::Completion;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use memory_store::MemoryStateStore;
