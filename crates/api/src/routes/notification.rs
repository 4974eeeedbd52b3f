//! Route definitions for the `/notifications` resource.
//!
//! All endpoints require authentication; broadcasting additionally
//! requires the `admin` role.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::notification;
use crate::state::AppState;

/// Routes mounted at `/notifications`.
///
/// ```text
/// GET    /                 -> list_inbox
/// POST   /broadcast        -> broadcast (admin)
/// GET    /unread-count     -> unread_count
/// POST   /{id}/read        -> mark_read
/// DELETE /{id}             -> delete_entry
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(notification::list_inbox))
        .route("/broadcast", post(notification::broadcast))
        .route("/unread-count", get(notification::unread_count))
        .route("/{id}/read", post(notification::mark_read))
        .route("/{id}", delete(notification::delete_entry))
}
