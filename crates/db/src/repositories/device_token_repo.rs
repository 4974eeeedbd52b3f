//! Repository for the `device_tokens` table.

use sqlx::PgPool;

use eventease_core::types::DbId;

use crate::models::device_token::DeviceToken;

const COLUMNS: &str = "id, user_id, token, created_at";

/// Provides device-token registration operations.
pub struct DeviceTokenRepo;

impl DeviceTokenRepo {
    /// Register a token for a user.
    ///
    /// A token already registered to another account is reassigned, since
    /// the device now belongs to whoever logged in on it last.
    pub async fn register(
        pool: &PgPool,
        user_id: DbId,
        token: &str,
    ) -> Result<DeviceToken, sqlx::Error> {
        let query = format!(
            "INSERT INTO device_tokens (user_id, token)
             VALUES ($1, $2)
             ON CONFLICT ON CONSTRAINT uq_device_tokens_token
             DO UPDATE SET user_id = EXCLUDED.user_id
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DeviceToken>(&query)
            .bind(user_id)
            .bind(token)
            .fetch_one(pool)
            .await
    }

    /// Remove a token, verifying it belongs to `user_id`.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn unregister(pool: &PgPool, user_id: DbId, token: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM device_tokens WHERE token = $1 AND user_id = $2")
            .bind(token)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove all of a user's tokens (opt-out or logout).
    pub async fn unregister_all_for_user(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM device_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// All registered tokens, i.e. every device whose owner currently wants
    /// push. Tokens are deleted on opt-out, so no extra filter is needed.
    pub async fn list_all_tokens(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT token FROM device_tokens ORDER BY id")
            .fetch_all(pool)
            .await
    }
}
