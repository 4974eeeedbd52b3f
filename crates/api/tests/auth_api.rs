//! HTTP-level integration tests for auth endpoints.
//!
//! Covers login, token refresh with rotation, logout, account lockout,
//! and deactivated-account handling.

mod common;

use axum::http::StatusCode;
use sqlx::PgPool;

use common::{body_json, get_auth, post_auth, post_json, TEST_PASSWORD};
use eventease_core::roles::{ROLE_ADMIN, ROLE_STUDENT};
use eventease_db::repositories::UserRepo;

/// Log in a user via the API and return the parsed JSON response.
async fn login(app: &axum::Router, username: &str, password: &str) -> serde_json::Value {
    let body = serde_json::json!({ "username": username, "password": password });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

/// Successful login returns tokens and user info.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_success(pool: PgPool) {
    let user = common::create_user_with_role(&pool, "headmaster", ROLE_ADMIN).await;
    let app = common::build_test_app(pool);

    let json = login(&app, "headmaster", TEST_PASSWORD).await;

    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert!(json["expires_in"].is_number());
    assert_eq!(json["user"]["id"], user.id);
    assert_eq!(json["user"]["username"], "headmaster");
    assert_eq!(json["user"]["role"], "admin");
}

/// Login with an incorrect password returns 401.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_wrong_password(pool: PgPool) {
    common::create_user_with_role(&pool, "someone", ROLE_STUDENT).await;
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "username": "someone", "password": "wrong" });
    let response = post_json(&app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Login with an unknown username returns 401, not 404.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_unknown_user(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "username": "ghost", "password": "whatever" });
    let response = post_json(&app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Five failed attempts lock the account; even the right password is
/// rejected until the lock expires.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_account_lockout(pool: PgPool) {
    common::create_user_with_role(&pool, "victim", ROLE_STUDENT).await;
    let app = common::build_test_app(pool);

    for _ in 0..5 {
        let body = serde_json::json!({ "username": "victim", "password": "guess" });
        let response = post_json(&app, "/api/v1/auth/login", body).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let body = serde_json::json!({ "username": "victim", "password": TEST_PASSWORD });
    let response = post_json(&app, "/api/v1/auth/login", body).await;
    assert_eq!(
        response.status(),
        StatusCode::FORBIDDEN,
        "locked account must reject even the correct password"
    );
}

/// A deactivated account cannot log in.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deactivated_account_cannot_login(pool: PgPool) {
    let user = common::create_user_with_role(&pool, "leaver", ROLE_STUDENT).await;
    UserRepo::deactivate(&pool, user.id).await.unwrap();
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "username": "leaver", "password": TEST_PASSWORD });
    let response = post_json(&app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// Refresh rotates the token: the new pair works, the old refresh token
/// is dead.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_refresh_rotation(pool: PgPool) {
    common::create_user_with_role(&pool, "rotator", ROLE_STUDENT).await;
    let app = common::build_test_app(pool);

    let first = login(&app, "rotator", TEST_PASSWORD).await;
    let old_refresh = first["refresh_token"].as_str().unwrap().to_string();

    let body = serde_json::json!({ "refresh_token": old_refresh });
    let response = post_json(&app, "/api/v1/auth/refresh", body.clone()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let second = body_json(response).await;
    assert!(second["access_token"].is_string());
    assert_ne!(second["refresh_token"], first["refresh_token"]);

    // The consumed refresh token must no longer work.
    let replay = post_json(&app, "/api/v1/auth/refresh", body).await;
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);
}

/// Logout revokes every session: the refresh token stops working.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_logout_revokes_sessions(pool: PgPool) {
    common::create_user_with_role(&pool, "quitter", ROLE_STUDENT).await;
    let app = common::build_test_app(pool);

    let json = login(&app, "quitter", TEST_PASSWORD).await;
    let access = json["access_token"].as_str().unwrap();
    let refresh = json["refresh_token"].as_str().unwrap();

    let response = post_auth(&app, "/api/v1/auth/logout", access).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let body = serde_json::json!({ "refresh_token": refresh });
    let response = post_json(&app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Protected routes reject requests without a token.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_missing_token_is_unauthorized(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = common::get(&app, "/api/v1/notifications").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// A garbage token is rejected.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invalid_token_is_unauthorized(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get_auth(&app, "/api/v1/notifications", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
