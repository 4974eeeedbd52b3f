//! Handlers for `/me/notifications` (the notification opt-in flag).

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use eventease_core::error::CoreError;
use eventease_db::repositories::{DeviceTokenRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PUT /me/notifications`.
#[derive(Debug, Deserialize)]
pub struct SetPreferenceRequest {
    pub enabled: bool,
}

/// Response body for `GET /me/notifications`.
#[derive(Debug, Serialize)]
pub struct PreferenceResponse {
    /// `null` means the user never set the flag, which counts as opted in.
    pub enabled: Option<bool>,
}

/// GET /api/v1/me/notifications
pub async fn get_preference(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<PreferenceResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;

    Ok(Json(DataResponse {
        data: PreferenceResponse {
            enabled: user.notifications_enabled,
        },
    }))
}

/// PUT /api/v1/me/notifications
///
/// Set the opt-in flag. Opting out also drops the user's device tokens,
/// so push delivery stops with the same request.
pub async fn set_preference(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<SetPreferenceRequest>,
) -> AppResult<Json<DataResponse<PreferenceResponse>>> {
    let found = UserRepo::set_notifications_enabled(&state.pool, auth.user_id, input.enabled).await?;
    if !found {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }));
    }

    if !input.enabled {
        let dropped = DeviceTokenRepo::unregister_all_for_user(&state.pool, auth.user_id).await?;
        if dropped > 0 {
            tracing::debug!(user_id = auth.user_id, dropped, "Dropped device tokens on opt-out");
        }
    }

    Ok(Json(DataResponse {
        data: PreferenceResponse {
            enabled: Some(input.enabled),
        },
    }))
}
