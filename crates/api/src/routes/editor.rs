//! Route definitions for editor uploads.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::editor_upload;
use crate::state::AppState;

/// Editor-owned routes at `/editor/uploads` and the recruiter listing at
/// `/editors/uploads`.
///
/// ```text
/// POST   /editor/uploads       -> create (editor)
/// GET    /editor/uploads       -> list_mine (editor)
/// DELETE /editor/uploads/{id}  -> delete (editor)
/// GET    /editors/uploads      -> list_all (recruiter)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/editor/uploads",
            get(editor_upload::list_mine).post(editor_upload::create),
        )
        .route("/editor/uploads/{id}", delete(editor_upload::delete))
        .route("/editors/uploads", get(editor_upload::list_all))
}
