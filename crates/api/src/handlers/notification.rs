//! Handlers for the `/notifications` resource.
//!
//! Broadcasting is admin-only; the inbox endpoints operate on the
//! authenticated user's own entries, so ownership is enforced by
//! construction (the entry id in the path is only ever matched together
//! with the caller's user id).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use eventease_core::error::CoreError;
use eventease_core::notification::NotificationPayload;
use eventease_core::types::DbId;
use eventease_db::models::inbox::InboxEntry;
use eventease_db::repositories::{BroadcastRepo, DeviceTokenRepo, InboxRepo};
use eventease_push::PushMessage;

use crate::error::{AppError, AppResult};
use crate::fanout::FanOutEngine;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /notifications/broadcast`.
#[derive(Debug, Deserialize, Validate)]
pub struct BroadcastRequest {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "body must not be empty"))]
    pub body: String,
    /// Kind-tagged auxiliary data; defaults to an empty generic payload.
    #[serde(default)]
    pub payload: NotificationPayload,
}

/// Response body for `POST /notifications/broadcast`.
#[derive(Debug, Serialize)]
pub struct BroadcastResponse {
    /// Inbox entries created.
    pub delivered: u64,
    /// Recipients skipped because they opted out.
    pub failed: u64,
    /// Canonical broadcast id; absent when the directory was empty.
    pub broadcast_id: Option<DbId>,
}

/// Response body for `GET /notifications/unread-count`.
#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub count: i64,
}

// ---------------------------------------------------------------------------
// Broadcast
// ---------------------------------------------------------------------------

/// POST /api/v1/notifications/broadcast
///
/// Fan a notification out to every opted-in user. Inbox materialization
/// is the source of truth; push delivery runs afterwards as a detached
/// best-effort task and its outcome never affects the response.
pub async fn broadcast(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(input): Json<BroadcastRequest>,
) -> AppResult<Json<DataResponse<BroadcastResponse>>> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    let engine = FanOutEngine::new(state.pool.clone());
    let outcome = engine
        .broadcast(&input.title, &input.body, &input.payload)
        .await?;

    if outcome.delivered > 0 {
        spawn_push(&state, &input);
    }

    Ok(Json(DataResponse {
        data: BroadcastResponse {
            delivered: outcome.delivered,
            failed: outcome.failed,
            broadcast_id: outcome.broadcast_id,
        },
    }))
}

/// Kick off best-effort push delivery for a committed broadcast.
///
/// Runs detached from the request: a slow or failing gateway cannot delay
/// the response, and per-token failures stay inside the push crate's
/// logging.
fn spawn_push(state: &AppState, input: &BroadcastRequest) {
    let Some(push) = state.push.clone() else {
        return;
    };
    let pool = state.pool.clone();
    let message = PushMessage {
        title: input.title.clone(),
        body: input.body.clone(),
        data: input.payload.to_value(),
    };

    tokio::spawn(async move {
        match DeviceTokenRepo::list_all_tokens(&pool).await {
            Ok(tokens) if !tokens.is_empty() => {
                push.send_multicast(&message, &tokens).await;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Could not load device tokens for push");
            }
        }
    });
}

// ---------------------------------------------------------------------------
// Inbox
// ---------------------------------------------------------------------------

/// GET /api/v1/notifications
///
/// List the authenticated user's inbox, newest first.
pub async fn list_inbox(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<InboxEntry>>>> {
    let entries = InboxRepo::list_for_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: entries }))
}

/// GET /api/v1/notifications/unread-count
///
/// Return the number of unread entries for the authenticated user.
pub async fn unread_count(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<UnreadCountResponse>>> {
    let count = InboxRepo::unread_count(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse {
        data: UnreadCountResponse { count },
    }))
}

/// POST /api/v1/notifications/{id}/read
///
/// Mark a single entry as read. Idempotent. Returns 204 No Content, or
/// 404 if the entry does not exist or belongs to someone else.
pub async fn mark_read(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(entry_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let broadcast_id = InboxRepo::mark_read(&state.pool, entry_id, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Inbox entry",
            id: entry_id,
        }))?;

    // Aggregate visibility on the canonical record is best-effort; the
    // per-entry read flag above is what the inbox surface reports.
    if let Some(bid) = broadcast_id {
        if let Err(e) = BroadcastRepo::add_read_by(&state.pool, bid, auth.user_id).await {
            tracing::warn!(
                broadcast_id = bid,
                error = %e,
                "Failed to update aggregate read set"
            );
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/notifications/{id}
///
/// Delete a single entry. Returns 204 No Content, or 404 if the entry
/// does not exist or belongs to someone else. Never touches the
/// canonical broadcast record or other users' entries.
pub async fn delete_entry(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(entry_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let found = InboxRepo::delete_entry(&state.pool, entry_id, auth.user_id).await?;
    if !found {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Inbox entry",
            id: entry_id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}
