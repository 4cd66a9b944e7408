pub mod auth;
pub mod editor;
pub mod health;
pub mod models;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                     register (public)
/// /auth/login                        login (public)
/// /auth/me                           current user (requires auth)
///
/// /models                            create own profile (model), catalogue (recruiter)
/// /models/me                         get, edit, delete own profile (model)
/// /models/me/images                  append gallery images (model)
/// /models/me/images/{image_id}       delete gallery image (model)
/// /models/me/image                   set profile image (model)
/// /models/{id}                       view profile (recruiter or owner)
///
/// /editor/uploads                    create, list own uploads (editor)
/// /editor/uploads/{id}               delete own upload (editor)
/// /editors/uploads                   browse all editor uploads (recruiter)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/models", models::router())
        .merge(editor::router())
}
