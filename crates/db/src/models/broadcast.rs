//! Broadcast entity model.

use serde::Serialize;
use sqlx::FromRow;

use eventease_core::types::{DbId, Timestamp};

/// A row from the `broadcasts` table: the canonical record of one fan-out.
///
/// `recipient_ids` is written once, after the inbox batch commits; it may
/// under-report if that best-effort update fails. `read_by_ids` tracks
/// aggregate visibility and is distinct from per-entry read state.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Broadcast {
    pub id: DbId,
    pub title: String,
    pub body: String,
    pub payload: serde_json::Value,
    pub recipient_ids: Vec<DbId>,
    pub read_by_ids: Vec<DbId>,
    pub created_at: Timestamp,
}
