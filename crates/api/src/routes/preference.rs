//! Route definitions for the `/me/notifications` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::preference;
use crate::state::AppState;

/// Routes mounted at `/me/notifications`.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(preference::get_preference).put(preference::set_preference),
    )
}
