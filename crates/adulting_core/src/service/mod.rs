//! Core use-case services.
//!
//! # Responsibility
//! - Drive the session aggregate through engine operations.
//! - Keep UI/FFI layers decoupled from storage and transport details.

pub mod clock;
pub mod progress_service;
