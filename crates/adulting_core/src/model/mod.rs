//! Domain model for the progress aggregate.
//!
//! # Responsibility
//! - Define the task and user-profile shapes persisted as one snapshot.
//! - Keep derived-state math (growth, flower stage) as pure functions.
//!
//! # Invariants
//! - Task ids are unique within one list.
//! - Snapshot JSON uses the camelCase field names of the stored format.

pub mod profile;
pub mod task;
pub mod timestamp;
