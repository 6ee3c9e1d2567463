//! Growth notification port.
//!
//! # Responsibility
//! - Define the port the engine calls after committing a growth change.
//! - Provide the no-op adapter and the best-effort HTTP adapter.
//!
//! # Invariants
//! - `growth_changed` never blocks the caller and never reports failure back.
//! - Adapters must not touch engine state.

mod http;

pub use http::{DispatchReport, HttpGrowthNotifier, HttpNotifierConfig};

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Receives growth values after the engine commits them.
pub trait GrowthNotifier: Send + Sync {
    /// Called with the committed growth (`0..=100`).
    fn growth_changed(&self, growth: u8);
}

/// Adapter that drops every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl GrowthNotifier for NoopNotifier {
    fn growth_changed(&self, _growth: u8) {}
}

/// Failure of one outbound notification request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// Server answered with a non-success status.
    Status(u16),
    /// Connection, DNS, TLS or timeout failure.
    Transport(String),
}

impl Display for NotifyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status(code) => write!(f, "HTTP {code}"),
            Self::Transport(message) => write!(f, "transport error: {message}"),
        }
    }
}

impl Error for NotifyError {}

impl From<ureq::Error> for NotifyError {
    fn from(value: ureq::Error) -> Self {
        match value {
            ureq::Error::Status(code, _) => Self::Status(code),
            ureq::Error::Transport(transport) => Self::Transport(transport.to_string()),
        }
    }
}
