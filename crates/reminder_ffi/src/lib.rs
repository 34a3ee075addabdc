//! Flutter-facing bindings for `reminder_core`.

pub mod api;
