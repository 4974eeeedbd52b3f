//! Repository for the `inbox_entries` table.
//!
//! Batch materialization happens in a single INSERT statement, so a batch
//! is atomic: readers observe either every staged entry or none of them.

use sqlx::PgPool;

use eventease_core::types::DbId;

use crate::models::inbox::{InboxEntry, InboxLink};

const COLUMNS: &str = "id, user_id, broadcast_id, event_id, title, body, payload, \
                        is_read, read_at, created_at";

/// Provides fan-out materialization and per-user inbox operations.
pub struct InboxRepo;

impl InboxRepo {
    /// Materialize one inbox entry per user id in a single atomic statement.
    ///
    /// For the broadcast lane, the partial unique index on
    /// `(user_id, broadcast_id)` turns a repeated fan-out into an upsert:
    /// existing entries are left untouched rather than duplicated. The
    /// calendar lane has no such constraint, since one event legitimately
    /// produces several entries per user over its lifecycle.
    ///
    /// Returns the number of rows actually inserted.
    pub async fn insert_batch(
        pool: &PgPool,
        user_ids: &[DbId],
        link: InboxLink,
        title: &str,
        body: &str,
        payload: &serde_json::Value,
    ) -> Result<u64, sqlx::Error> {
        if user_ids.is_empty() {
            return Ok(0);
        }

        let query = match link {
            InboxLink::Broadcast(_) => {
                "INSERT INTO inbox_entries (user_id, broadcast_id, title, body, payload) \
                 SELECT t.user_id, $2, $3, $4, $5 FROM unnest($1::bigint[]) AS t(user_id) \
                 ON CONFLICT (user_id, broadcast_id) WHERE broadcast_id IS NOT NULL DO NOTHING"
            }
            InboxLink::Event(_) => {
                "INSERT INTO inbox_entries (user_id, event_id, title, body, payload) \
                 SELECT t.user_id, $2, $3, $4, $5 FROM unnest($1::bigint[]) AS t(user_id)"
            }
        };

        let link_id = match link {
            InboxLink::Broadcast(id) | InboxLink::Event(id) => id,
        };

        let result = sqlx::query(query)
            .bind(user_ids)
            .bind(link_id)
            .bind(title)
            .bind(body)
            .bind(payload)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// List all of a user's entries, newest first.
    ///
    /// Deliberately unbounded: the inbox surface has no pagination
    /// contract and callers must handle arbitrarily large results.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<InboxEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM inbox_entries \
             WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, InboxEntry>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Count a user's unread entries.
    ///
    /// Queries the same table and predicate as [`list_for_user`]
    /// (no cache in between), so the two can never disagree at a fixed
    /// point in time.
    ///
    /// [`list_for_user`]: InboxRepo::list_for_user
    pub async fn unread_count(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let count: Option<i64> = sqlx::query_scalar(
            "SELECT COUNT(*) FROM inbox_entries WHERE user_id = $1 AND is_read = false",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(count.unwrap_or(0))
    }

    /// Mark an entry read, verifying ownership in the same statement.
    ///
    /// Idempotent: marking an already-read entry succeeds and leaves
    /// `read_at` at its original value.
    ///
    /// Returns `None` when no entry with this id belongs to `user_id`,
    /// otherwise `Some(broadcast_id)` of the updated entry (which is
    /// itself `None` for calendar-lane entries).
    pub async fn mark_read(
        pool: &PgPool,
        entry_id: DbId,
        user_id: DbId,
    ) -> Result<Option<Option<DbId>>, sqlx::Error> {
        sqlx::query_scalar(
            "UPDATE inbox_entries \
             SET is_read = true, read_at = COALESCE(read_at, NOW()) \
             WHERE id = $1 AND user_id = $2 \
             RETURNING broadcast_id",
        )
        .bind(entry_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Delete an entry, verifying ownership in the same statement.
    ///
    /// Returns `true` if a row was deleted. Never touches the canonical
    /// broadcast record or any other user's entries.
    pub async fn delete_entry(
        pool: &PgPool,
        entry_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM inbox_entries WHERE id = $1 AND user_id = $2")
            .bind(entry_id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count entries referencing a broadcast.
    pub async fn count_for_broadcast(pool: &PgPool, broadcast_id: DbId) -> Result<i64, sqlx::Error> {
        let count: Option<i64> =
            sqlx::query_scalar("SELECT COUNT(*) FROM inbox_entries WHERE broadcast_id = $1")
                .bind(broadcast_id)
                .fetch_one(pool)
                .await?;
        Ok(count.unwrap_or(0))
    }
}
