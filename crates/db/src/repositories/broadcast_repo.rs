//! Repository for the `broadcasts` table.

use sqlx::PgPool;

use eventease_core::types::DbId;

use crate::models::broadcast::Broadcast;

const COLUMNS: &str = "id, title, body, payload, recipient_ids, read_by_ids, created_at";

/// Provides operations on canonical broadcast records.
pub struct BroadcastRepo;

impl BroadcastRepo {
    /// Create a broadcast with empty recipient and read sets, returning the
    /// generated id.
    ///
    /// The fan-out engine calls this before staging any inbox entries, so
    /// every entry can reference a broadcast id that already exists.
    pub async fn create(
        pool: &PgPool,
        title: &str,
        body: &str,
        payload: &serde_json::Value,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO broadcasts (title, body, payload) \
             VALUES ($1, $2, $3) \
             RETURNING id",
        )
        .bind(title)
        .bind(body)
        .bind(payload)
        .fetch_one(pool)
        .await
    }

    /// Find a broadcast by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Broadcast>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM broadcasts WHERE id = $1");
        sqlx::query_as::<_, Broadcast>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List broadcasts, newest first.
    pub async fn list(pool: &PgPool, limit: i64) -> Result<Vec<Broadcast>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM broadcasts ORDER BY created_at DESC LIMIT $1");
        sqlx::query_as::<_, Broadcast>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Record the recipient set a committed fan-out actually staged.
    pub async fn set_recipients(
        pool: &PgPool,
        id: DbId,
        recipient_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE broadcasts SET recipient_ids = $2 WHERE id = $1")
            .bind(id)
            .bind(recipient_ids)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Append a user to `read_by_ids` with array-union semantics.
    ///
    /// Adding a user that is already present is a no-op.
    pub async fn add_read_by(pool: &PgPool, id: DbId, user_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE broadcasts \
             SET read_by_ids = array_append(read_by_ids, $2) \
             WHERE id = $1 AND NOT ($2 = ANY(read_by_ids))",
        )
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(())
    }
}
