//! HTTP-level integration tests for registration, login and `/auth/me`.

mod common;

use axum::http::StatusCode;
use common::{assert_error, body_json, get, get_auth, memory_store, post_json, register};
use sqlx::MySqlPool;

fn app(pool: MySqlPool) -> axum::Router {
    common::build_test_app(pool, memory_store())
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_returns_token_and_user(pool: MySqlPool) {
    let body = serde_json::json!({
        "name": "  Rita Recruiter ",
        "email": "Rita@Agency.COM",
        "password": "long-enough-password",
        "role": "recruiter",
    });
    let response = post_json(app(pool), "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert!(json["token"].is_string());
    assert_eq!(json["expires_in"], 3600);
    assert_eq!(json["user"]["name"], "Rita Recruiter");
    assert_eq!(json["user"]["email"], "rita@agency.com");
    assert_eq!(json["user"]["role"], "recruiter");
    assert_eq!(json["user"]["has_profile"], false);
    assert!(json["user"].get("password_hash").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_duplicate_email_returns_409(pool: MySqlPool) {
    let app = app(pool);
    register(app.clone(), "dup@example.com", "model").await;

    let body = serde_json::json!({
        "name": "Second",
        "email": "DUP@example.com",
        "password": "long-enough-password",
        "role": "editor",
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;
    assert_error(response, StatusCode::CONFLICT, "CONFLICT").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_rejects_unknown_role(pool: MySqlPool) {
    let body = serde_json::json!({
        "name": "Admin",
        "email": "admin@example.com",
        "password": "long-enough-password",
        "role": "admin",
    });
    let response = post_json(app(pool), "/api/v1/auth/register", body).await;
    assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_rejects_bad_email_and_short_password(pool: MySqlPool) {
    let app = app(pool);

    let bad_email = serde_json::json!({
        "name": "X",
        "email": "not-an-email",
        "password": "long-enough-password",
        "role": "model",
    });
    let response = post_json(app.clone(), "/api/v1/auth/register", bad_email).await;
    assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;

    let short_password = serde_json::json!({
        "name": "X",
        "email": "x@example.com",
        "password": "short",
        "role": "model",
    });
    let response = post_json(app, "/api/v1/auth/register", short_password).await;
    assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_succeeds_with_case_insensitive_email(pool: MySqlPool) {
    let app = app(pool);
    let (_, user_id) = register(app.clone(), "eve@example.com", "editor").await;

    let body = serde_json::json!({ "email": "EVE@example.com", "password": "correct-horse-battery" });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["token"].is_string());
    assert_eq!(json["user"]["id"], user_id);
    assert_eq!(json["user"]["role"], "editor");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_wrong_password_returns_401(pool: MySqlPool) {
    let app = app(pool);
    register(app.clone(), "mallory@example.com", "model").await;

    let body = serde_json::json!({ "email": "mallory@example.com", "password": "wrong-password" });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_unknown_email_returns_401(pool: MySqlPool) {
    let body = serde_json::json!({ "email": "nobody@example.com", "password": "whatever-123" });
    let response = post_json(app(pool), "/api/v1/auth/login", body).await;
    assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn me_returns_current_user(pool: MySqlPool) {
    let app = app(pool);
    let (token, user_id) = register(app.clone(), "pat@example.com", "photographer").await;

    let response = get_auth(app, "/api/v1/auth/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], user_id);
    assert_eq!(json["data"]["role"], "photographer");
    assert_eq!(json["data"]["has_profile"], false);
}

// ---------------------------------------------------------------------------
// Rejections that never reach the database
// ---------------------------------------------------------------------------

#[tokio::test]
async fn me_without_token_returns_401() {
    let app = common::build_test_app(common::lazy_pool(), memory_store());
    let response = get(app, "/api/v1/auth/me").await;
    assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
}

#[tokio::test]
async fn me_with_garbage_token_returns_401() {
    let app = common::build_test_app(common::lazy_pool(), memory_store());
    let response = get_auth(app, "/api/v1/auth/me", "not.a.jwt").await;
    assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
}

#[tokio::test]
async fn token_with_unknown_role_is_rejected() {
    let app = common::build_test_app(common::lazy_pool(), memory_store());
    let token = common::token_for(1, "admin");
    let response = get_auth(app, "/api/v1/models/me", &token).await;
    assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
}

#[tokio::test]
async fn catalogue_requires_recruiter_role() {
    let app = common::build_test_app(common::lazy_pool(), memory_store());
    for role in ["model", "photographer", "editor"] {
        let token = common::token_for(1, role);
        let response = get_auth(app.clone(), "/api/v1/models", &token).await;
        assert_error(response, StatusCode::FORBIDDEN, "FORBIDDEN").await;

        let response = get_auth(app.clone(), "/api/v1/editors/uploads", &token).await;
        assert_error(response, StatusCode::FORBIDDEN, "FORBIDDEN").await;
    }
}

#[tokio::test]
async fn profile_routes_require_model_role() {
    let app = common::build_test_app(common::lazy_pool(), memory_store());
    let token = common::token_for(1, "recruiter");
    let response = get_auth(app.clone(), "/api/v1/models/me", &token).await;
    assert_error(response, StatusCode::FORBIDDEN, "FORBIDDEN").await;

    let response = get_auth(app, "/api/v1/editor/uploads", &token).await;
    assert_error(response, StatusCode::FORBIDDEN, "FORBIDDEN").await;
}
