//! User entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use eventease_core::types::{DbId, Timestamp};

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses
/// directly. Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: DbId,
    pub is_active: bool,
    /// `None` means the flag was never set. Only `Some(false)` opts the
    /// user out of notification fan-out.
    pub notifications_enabled: Option<bool>,
    pub last_login_at: Option<Timestamp>,
    pub failed_login_count: i32,
    pub locked_until: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// Whether this user should receive fan-out notifications.
    ///
    /// Absence of the flag counts as opted in; only an explicit `false`
    /// excludes the user.
    pub fn wants_notifications(&self) -> bool {
        self.notifications_enabled != Some(false)
    }
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub username: String,
    pub email: String,
    /// Resolved role name (e.g. `"admin"`, `"student_head"`).
    pub role: String,
    pub role_id: DbId,
    pub is_active: bool,
    pub notifications_enabled: Option<bool>,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl UserResponse {
    /// Combine a [`User`] row with its resolved role name.
    pub fn from_user(user: &User, role: impl Into<String>) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: role.into(),
            role_id: user.role_id,
            is_active: user.is_active,
            notifications_enabled: user.notifications_enabled,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
        }
    }
}

/// DTO for creating a new user.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: DbId,
}

/// DTO for updating an existing user. All fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role_id: Option<DbId>,
    pub is_active: Option<bool>,
}
