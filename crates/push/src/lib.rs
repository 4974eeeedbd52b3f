//! Push-gateway client.
//!
//! Delivers OS-level push notifications to registered device tokens.
//! Push is a lossy, best-effort secondary channel: failures are counted
//! and logged, never propagated, and never affect inbox materialization.

pub mod client;

pub use client::{PushClient, PushConfig, PushMessage, PushReport};
