use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use eventease_api::config::ServerConfig;
use eventease_api::{bootstrap, router, state};
use eventease_push::{PushClient, PushConfig};

use state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eventease_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = eventease_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    eventease_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    eventease_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Administrative subcommands ---
    if let Some(command) = std::env::args().nth(1) {
        match command.as_str() {
            "bootstrap-admin" => {
                run_bootstrap_admin(&pool).await;
                return;
            }
            other => {
                eprintln!("Unknown command: {other}. Supported: bootstrap-admin");
                std::process::exit(2);
            }
        }
    }

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Push gateway (optional) ---
    let push = match PushConfig::from_env() {
        Some(push_config) => {
            tracing::info!(gateway = %push_config.gateway_url, "Push gateway configured");
            Some(Arc::new(PushClient::new(push_config)))
        }
        None => {
            tracing::info!("No push gateway configured; inbox delivery only");
            None
        }
    };

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        push,
    };

    // --- Router ---
    let app = router::build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Create the first admin account from `ADMIN_USERNAME` / `ADMIN_EMAIL` /
/// `ADMIN_PASSWORD`, unless an admin already exists.
async fn run_bootstrap_admin(pool: &eventease_db::DbPool) {
    let username = std::env::var("ADMIN_USERNAME").expect("ADMIN_USERNAME must be set");
    let email = std::env::var("ADMIN_EMAIL").expect("ADMIN_EMAIL must be set");
    let password = std::env::var("ADMIN_PASSWORD").expect("ADMIN_PASSWORD must be set");

    match bootstrap::ensure_admin(pool, &username, &email, &password).await {
        Ok(bootstrap::BootstrapOutcome::Created(id)) => {
            tracing::info!(user_id = id, "Bootstrap complete");
        }
        Ok(bootstrap::BootstrapOutcome::AlreadyBootstrapped) => {
            tracing::info!("Bootstrap skipped, admin already exists");
        }
        Err(e) => {
            tracing::error!(error = %e, "Bootstrap failed");
            std::process::exit(1);
        }
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
