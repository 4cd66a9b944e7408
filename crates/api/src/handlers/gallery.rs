//! Handlers for the caller's model gallery (`/models/me/images`, `/models/me/image`).

use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use castlane_core::error::CoreError;
use castlane_core::gallery::{self, MAX_GALLERY_IMAGES};
use castlane_core::media::{MediaKind, PREFIX_MODEL_IMAGES};
use castlane_core::types::DbId;
use castlane_db::models::model_image::ModelImage;
use castlane_db::models::model_profile::ModelProfile;
use castlane_db::repositories::{AppendOutcome, DeleteImageOutcome, ModelImageRepo, ModelRepo};
use castlane_storage::{purge_urls, UploadBatch};
use serde::Deserialize;

use super::model_profile::find_own_profile;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireModel;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::upload::{self, validate_file, MultipartForm};

/// Request body for `PUT /models/me/image`.
#[derive(Debug, Deserialize)]
pub struct SetPrimaryImageRequest {
    pub image_id: DbId,
}

/// POST /api/v1/models/me/images
///
/// Append one or more `images` to the gallery. The gallery never grows past
/// eight images; the whole request is rejected if it would.
pub async fn add_images(
    State(state): State<AppState>,
    RequireModel(user): RequireModel,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<Vec<ModelImage>>>)> {
    let profile = find_own_profile(&state, user.user_id).await?;
    let mut form = MultipartForm::read(multipart, &["images"]).await?;

    let images = form.take_files("images");

    // Early rejection before uploading; the repository re-checks under a row lock.
    let existing = ModelImageRepo::count_by_model(&state.pool, profile.id).await? as usize;
    gallery::validate_append(existing, images.len())?;

    let images = images
        .into_iter()
        .map(|file| validate_file(file, MediaKind::Image))
        .collect::<AppResult<Vec<_>>>()?;

    let mut batch = UploadBatch::new(Arc::clone(&state.media));
    let result: AppResult<Vec<ModelImage>> = async {
        let mut urls = Vec::with_capacity(images.len());
        for image in images {
            let url = upload::store(&mut batch, PREFIX_MODEL_IMAGES, user.user_id, image).await?;
            urls.push(url);
        }

        match ModelImageRepo::append(&state.pool, profile.id, &urls, MAX_GALLERY_IMAGES).await? {
            AppendOutcome::Appended(gallery) => Ok(gallery),
            // Another request filled the gallery after the early check.
            AppendOutcome::LimitExceeded { existing } => {
                Err(AppError::Core(CoreError::Conflict(format!(
                    "Gallery already holds {existing} images; at most {MAX_GALLERY_IMAGES} are allowed"
                ))))
            }
            AppendOutcome::ModelNotFound => Err(AppError::Core(CoreError::NotFound {
                entity: "ModelProfile",
                id: profile.id,
            })),
        }
    }
    .await;
    let gallery = upload::settle(batch, result).await?;

    tracing::info!(model_id = profile.id, images = gallery.len(), "Gallery images added");

    Ok((StatusCode::CREATED, Json(DataResponse { data: gallery })))
}

/// PUT /api/v1/models/me/image
///
/// Make one of the caller's own gallery images the profile picture.
pub async fn set_primary_image(
    State(state): State<AppState>,
    RequireModel(user): RequireModel,
    Json(input): Json<SetPrimaryImageRequest>,
) -> AppResult<Json<DataResponse<ModelProfile>>> {
    let profile = find_own_profile(&state, user.user_id).await?;

    let updated = ModelRepo::set_primary_image(&state.pool, profile.id, input.image_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "Image {} is not part of your gallery",
                input.image_id
            )))
        })?;

    tracing::info!(model_id = profile.id, image_id = input.image_id, "Profile image changed");

    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/models/me/images/{image_id}
///
/// Remove a gallery image and its stored object. The current profile image
/// cannot be removed (409); pick another one first.
pub async fn delete_image(
    State(state): State<AppState>,
    RequireModel(user): RequireModel,
    Path(image_id): Path<DbId>,
) -> AppResult<StatusCode> {
    let profile = find_own_profile(&state, user.user_id).await?;

    match ModelImageRepo::delete_unless_primary(&state.pool, profile.id, image_id).await? {
        DeleteImageOutcome::Deleted(image) => {
            purge_urls(state.media.as_ref(), [image.image_url.as_str()]).await;
            tracing::info!(model_id = profile.id, image_id, "Gallery image deleted");
            Ok(StatusCode::NO_CONTENT)
        }
        DeleteImageOutcome::IsPrimary => Err(AppError::Core(CoreError::Conflict(
            "Cannot delete the current profile image; choose another one first".into(),
        ))),
        DeleteImageOutcome::NotFound => Err(AppError::Core(CoreError::NotFound {
            entity: "ModelImage",
            id: image_id,
        })),
    }
}
