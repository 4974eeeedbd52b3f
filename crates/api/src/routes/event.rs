//! Route definitions for the `/events` resource.
//!
//! Reads require any authenticated user; mutations require the
//! `student_head` (or `admin`) role.

use axum::routing::get;
use axum::Router;

use crate::handlers::event;
use crate::state::AppState;

/// Routes mounted at `/events`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(event::list_events).post(event::create_event))
        .route(
            "/{id}",
            get(event::get_event)
                .put(event::update_event)
                .delete(event::delete_event),
        )
}
