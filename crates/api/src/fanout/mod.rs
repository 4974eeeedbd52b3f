//! Notification fan-out.
//!
//! [`FanOutEngine`] materializes one inbox entry per eligible recipient
//! out of a single broadcast or calendar-event change.

pub mod engine;

pub use engine::{BroadcastOutcome, FanOutEngine};
