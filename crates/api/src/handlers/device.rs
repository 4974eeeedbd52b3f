//! Handlers for the `/devices` resource (push token registration).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use eventease_core::error::CoreError;
use eventease_db::models::device_token::DeviceToken;
use eventease_db::repositories::DeviceTokenRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /devices`.
#[derive(Debug, Deserialize)]
pub struct RegisterDeviceRequest {
    pub token: String,
}

/// POST /api/v1/devices
///
/// Register the caller's device token for push delivery. Registering a
/// token that already exists reassigns it to the caller. Returns 201.
pub async fn register_device(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<RegisterDeviceRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<DeviceToken>>)> {
    if input.token.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "token must not be empty".into(),
        )));
    }

    let device = DeviceTokenRepo::register(&state.pool, auth.user_id, &input.token).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: device })))
}

/// DELETE /api/v1/devices/{token}
///
/// Remove one of the caller's device tokens. Returns 204 No Content, or
/// 404 if the token is not registered to the caller.
pub async fn unregister_device(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<impl IntoResponse> {
    let found = DeviceTokenRepo::unregister(&state.pool, auth.user_id, &token).await?;
    if !found {
        return Err(AppError::NotFound(
            "Device token is not registered to this account".into(),
        ));
    }
    Ok(StatusCode::NO_CONTENT)
}
