pub mod admin;
pub mod auth;
pub mod device;
pub mod event;
pub mod health;
pub mod notification;
pub mod preference;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                         login (public)
/// /auth/refresh                       refresh (public)
/// /auth/logout                        logout (requires auth)
///
/// /admin/users                        list, create (admin only)
/// /admin/users/{id}                   get, update, deactivate
/// /admin/users/{id}/reset-password    reset password
///
/// /notifications                      list own inbox
/// /notifications/broadcast            fan out a broadcast (admin only)
/// /notifications/unread-count         unread count
/// /notifications/{id}/read            mark read
/// /notifications/{id}                 delete entry
///
/// /events                             list, create (student head)
/// /events/{id}                        get, update, delete (student head)
///
/// /devices                            register device token
/// /devices/{token}                    unregister device token
///
/// /me/notifications                   get / set the opt-in flag
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/admin/users", admin::router())
        .nest("/notifications", notification::router())
        .nest("/events", event::router())
        .nest("/devices", device::router())
        .nest("/me/notifications", preference::router())
}
