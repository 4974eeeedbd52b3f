use serde::Serialize;
use sqlx::FromRow;

use eventease_core::types::{DbId, Timestamp};

/// A row from the `roles` lookup table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Role {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub created_at: Timestamp,
}
