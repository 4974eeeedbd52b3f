//! Inbox entry entity model.

use serde::Serialize;
use sqlx::FromRow;

use eventease_core::types::{DbId, Timestamp};

/// A row from the `inbox_entries` table: one recipient's private copy of a
/// notification.
///
/// Exactly one of `broadcast_id` / `event_id` is set, depending on which
/// fan-out lane produced the entry. Title, body, and payload are copies
/// taken at fan-out time.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct InboxEntry {
    pub id: DbId,
    pub user_id: DbId,
    pub broadcast_id: Option<DbId>,
    pub event_id: Option<DbId>,
    pub title: String,
    pub body: String,
    pub payload: serde_json::Value,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// Which record a batch of inbox entries is linked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboxLink {
    /// The canonical-broadcast lane; entries reference `broadcasts.id`.
    Broadcast(DbId),
    /// The calendar lane; entries reference a calendar event id with no
    /// canonical broadcast row.
    Event(DbId),
}
