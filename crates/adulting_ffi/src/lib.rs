//! Flutter-facing bindings for the Adulting 101 core.

pub mod api;
