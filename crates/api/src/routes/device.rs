//! Route definitions for the `/devices` resource.

use axum::routing::{delete, post};
use axum::Router;

use crate::handlers::device;
use crate::state::AppState;

/// Routes mounted at `/devices`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(device::register_device))
        .route("/{token}", delete(device::unregister_device))
}
