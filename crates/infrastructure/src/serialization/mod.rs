//! Deterministic JSON for persisted session files.
//!
//! Session files are written with 2-space indentation, a trailing newline
//! and sorted cache keys (`BTreeMap` in the domain types), so repeated saves
//! of the same state produce identical bytes.

mod json;

pub use json::*;
