//! Shared domain types for the Event-Ease backend.
//!
//! This crate holds everything the other workspace crates agree on:
//! database-id and timestamp aliases, the domain error taxonomy, role
//! names, and the typed notification payload carried by every broadcast
//! and inbox entry.

pub mod error;
pub mod notification;
pub mod roles;
pub mod types;
