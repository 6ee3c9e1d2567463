//! Repository layer over the durable key/value store.
//!
//! # Responsibility
//! - Define the storage contract the engine persists through (`KvRepository`).
//! - Own snapshot encoding/decoding for the profile key.
//!
//! # Invariants
//! - Keys are non-empty after trimming.
//! - Decoded snapshots are normalized before they reach the engine.

pub mod kv_repo;
pub mod profile_store;
