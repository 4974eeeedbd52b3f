//! Route definitions for the `/admin/users` resource.
//!
//! All endpoints require the `admin` role.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin/users`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::list_users).post(admin::create_user))
        .route(
            "/{id}",
            get(admin::get_user)
                .put(admin::update_user)
                .delete(admin::deactivate_user),
        )
        .route("/{id}/reset-password", post(admin::reset_password))
}
