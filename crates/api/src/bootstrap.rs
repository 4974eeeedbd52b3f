//! Idempotent first-run admin bootstrap.
//!
//! Run as an explicit administrative command (`eventease-api
//! bootstrap-admin`), never as an always-available endpoint. Credentials
//! come from the environment, not from source.

use anyhow::Context;

use eventease_core::roles::ROLE_ADMIN;
use eventease_core::types::DbId;
use eventease_db::models::user::CreateUser;
use eventease_db::repositories::{RoleRepo, UserRepo};
use eventease_db::DbPool;

use crate::auth::password::{hash_password, validate_password_strength};

/// Minimum length for the bootstrap admin password.
const MIN_PASSWORD_LENGTH: usize = 12;

/// What `ensure_admin` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// A fresh admin account was created with the given id.
    Created(DbId),
    /// At least one admin already exists; nothing was changed.
    AlreadyBootstrapped,
}

/// Ensure exactly one privileged account exists.
///
/// Checks for any existing admin before creating one, so re-running the
/// command is a no-op rather than an error or a duplicate.
pub async fn ensure_admin(
    pool: &DbPool,
    username: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<BootstrapOutcome> {
    let existing = UserRepo::count_by_role(pool, ROLE_ADMIN).await?;
    if existing > 0 {
        tracing::info!(existing, "Admin account already present, skipping bootstrap");
        return Ok(BootstrapOutcome::AlreadyBootstrapped);
    }

    validate_password_strength(password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| anyhow::anyhow!("Rejecting bootstrap password: {msg}"))?;

    let role = RoleRepo::find_by_name(pool, ROLE_ADMIN)
        .await?
        .context("admin role missing from roles table; did migrations run?")?;

    let password_hash =
        hash_password(password).map_err(|e| anyhow::anyhow!("Password hashing error: {e}"))?;

    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            role_id: role.id,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, username, "Bootstrap admin account created");
    Ok(BootstrapOutcome::Created(user.id))
}
