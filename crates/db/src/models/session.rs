use sqlx::FromRow;

use eventease_core::types::{DbId, Timestamp};

/// A row from the `sessions` table.
///
/// One row per issued refresh token; rotation revokes the old row and
/// inserts a new one.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: DbId,
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    pub revoked_at: Option<Timestamp>,
    pub created_at: Timestamp,
}
