//! Route definitions for the `/models` resource.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::{gallery, model_profile};
use crate::state::AppState;

/// Routes mounted at `/models`.
///
/// ```text
/// POST   /                     -> create (model)
/// GET    /                     -> list (recruiter)
/// GET    /me                   -> get_mine
/// PUT    /me                   -> update_mine
/// DELETE /me                   -> delete_mine
/// POST   /me/images            -> add_images
/// DELETE /me/images/{image_id} -> delete_image
/// PUT    /me/image             -> set_primary_image
/// GET    /{id}                 -> get_by_id (recruiter or owner)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(model_profile::create).get(model_profile::list))
        .route(
            "/me",
            get(model_profile::get_mine)
                .put(model_profile::update_mine)
                .delete(model_profile::delete_mine),
        )
        .route("/me/images", post(gallery::add_images))
        .route("/me/images/{image_id}", delete(gallery::delete_image))
        .route("/me/image", put(gallery::set_primary_image))
        .route("/{id}", get(model_profile::get_by_id))
}
