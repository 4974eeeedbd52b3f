//! Handlers for the `/events` resource (shared calendar).
//!
//! Reads are open to any authenticated user; mutations require the
//! `student_head` role (or admin) and fan a notification out through the
//! calendar lane after the change lands.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use eventease_core::error::CoreError;
use eventease_core::notification::EventAction;
use eventease_core::types::DbId;
use eventease_db::models::calendar_event::{
    CalendarEvent, CreateCalendarEvent, UpdateCalendarEvent,
};
use eventease_db::repositories::CalendarEventRepo;

use crate::error::{AppError, AppResult};
use crate::fanout::FanOutEngine;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireStudentHead;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/events
///
/// List all calendar events in calendar order.
pub async fn list_events(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<CalendarEvent>>>> {
    let events = CalendarEventRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: events }))
}

/// GET /api/v1/events/{id}
pub async fn get_event(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
) -> AppResult<Json<DataResponse<CalendarEvent>>> {
    let event = CalendarEventRepo::find_by_id(&state.pool, event_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Event",
            id: event_id,
        }))?;
    Ok(Json(DataResponse { data: event }))
}

/// POST /api/v1/events
///
/// Create an event and notify every opted-in user. Returns 201 Created.
pub async fn create_event(
    State(state): State<AppState>,
    RequireStudentHead(creator): RequireStudentHead,
    Json(input): Json<CreateCalendarEvent>,
) -> AppResult<(StatusCode, Json<DataResponse<CalendarEvent>>)> {
    validate_event_fields(&input.title, input.start_time, input.end_time)?;

    let event = CalendarEventRepo::create(&state.pool, creator.user_id, &input).await?;

    let engine = FanOutEngine::new(state.pool.clone());
    engine.notify_event(&event, EventAction::Created).await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: event })))
}

/// PUT /api/v1/events/{id}
///
/// Update an event and notify every opted-in user of the new details.
pub async fn update_event(
    State(state): State<AppState>,
    RequireStudentHead(_editor): RequireStudentHead,
    Path(event_id): Path<DbId>,
    Json(input): Json<UpdateCalendarEvent>,
) -> AppResult<Json<DataResponse<CalendarEvent>>> {
    if let Some(title) = &input.title {
        if title.trim().is_empty() {
            return Err(AppError::Core(CoreError::Validation(
                "title must not be empty".into(),
            )));
        }
    }

    let event = CalendarEventRepo::update(&state.pool, event_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Event",
            id: event_id,
        }))?;

    let engine = FanOutEngine::new(state.pool.clone());
    engine.notify_event(&event, EventAction::Updated).await?;

    Ok(Json(DataResponse { data: event }))
}

/// DELETE /api/v1/events/{id}
///
/// Delete an event, then notify every opted-in user of the cancellation.
/// The notification is synthesized from the row as it existed before the
/// delete. Returns 204 No Content.
pub async fn delete_event(
    State(state): State<AppState>,
    RequireStudentHead(_editor): RequireStudentHead,
    Path(event_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let event = CalendarEventRepo::find_by_id(&state.pool, event_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Event",
            id: event_id,
        }))?;

    CalendarEventRepo::delete(&state.pool, event_id).await?;

    let engine = FanOutEngine::new(state.pool.clone());
    engine.notify_event(&event, EventAction::Deleted).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Reject blank titles and end times at or before the start time.
fn validate_event_fields(
    title: &str,
    start_time: chrono::NaiveTime,
    end_time: chrono::NaiveTime,
) -> AppResult<()> {
    if title.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "title must not be empty".into(),
        )));
    }
    if end_time <= start_time {
        return Err(AppError::Core(CoreError::Validation(
            "end_time must be after start_time".into(),
        )));
    }
    Ok(())
}
