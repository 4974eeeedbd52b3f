use std::sync::Arc;

use eventease_push::PushClient;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: eventease_db::DbPool,
    /// Server configuration (JWT settings, timeouts, CORS).
    pub config: Arc<ServerConfig>,
    /// Push gateway client; `None` when no gateway is configured, in which
    /// case inbox entries are the only delivery channel.
    pub push: Option<Arc<PushClient>>,
}
