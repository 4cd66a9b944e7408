//! Handlers for model profiles (`/models`).
//!
//! Media are validated in full before anything is uploaded. Uploads go
//! through an [`UploadBatch`] so that a failed database write removes them
//! again, and assets of deleted or replaced rows are purged only after the
//! database change has committed.

use std::sync::Arc;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use castlane_core::error::CoreError;
use castlane_core::gallery;
use castlane_core::media::{MediaKind, PREFIX_MODEL_IMAGES, PREFIX_MODEL_VIDEOS};
use castlane_core::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use castlane_core::profile::{
    normalize_instagram, normalize_portfolio, normalize_text, validate_name, Gender,
    MAX_BIO_LENGTH,
};
use castlane_core::types::DbId;
use castlane_db::models::model_profile::{
    CreateModelProfile, ModelProfile, ModelProfileDetail, ProfileUpdate, UpdateModelProfile,
};
use castlane_db::repositories::ModelRepo;
use castlane_storage::{purge_urls, UploadBatch};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireModel, RequireRecruiter};
use crate::query::ModelCatalogueParams;
use crate::response::{DataResponse, PageResponse};
use crate::state::AppState;
use crate::upload::{self, validate_file, MultipartForm};

/// Multipart parts read as files by the profile endpoints.
const PROFILE_FILE_FIELDS: &[&str] = &["images", "sample_video"];

/// POST /api/v1/models
///
/// Create the caller's profile from a multipart form: text fields plus 4 to 8
/// `images` and an optional `sample_video`. Returns 201 with the profile and
/// its gallery.
pub async fn create(
    State(state): State<AppState>,
    RequireModel(user): RequireModel,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<ModelProfileDetail>>)> {
    if ModelRepo::find_by_user(&state.pool, user.user_id).await?.is_some() {
        return Err(profile_exists());
    }

    let mut form = MultipartForm::read(multipart, PROFILE_FILE_FIELDS).await?;

    let name = validate_name(form.required_text("name")?)?;
    let gender = Gender::parse(form.required_text("gender")?)?;
    let bio = normalize_text(form.text("bio"), MAX_BIO_LENGTH, "Bio")?;
    let portfolio = normalize_portfolio(form.text("portfolio"))?;
    let instagram_id = normalize_instagram(form.text("instagram_id"))?;
    let primary_index = parse_primary_index(form.text("primary_image"))?;

    let images = form.take_files("images");
    gallery::validate_initial_count(images.len())?;
    gallery::validate_primary_index(primary_index, images.len())?;
    let images = images
        .into_iter()
        .map(|file| validate_file(file, MediaKind::Image))
        .collect::<AppResult<Vec<_>>>()?;
    let video = form
        .take_file("sample_video")?
        .map(|file| validate_file(file, MediaKind::Video))
        .transpose()?;

    let mut batch = UploadBatch::new(Arc::clone(&state.media));
    let result: AppResult<ModelProfileDetail> = async {
        let mut image_urls = Vec::with_capacity(images.len());
        for image in images {
            let url = upload::store(&mut batch, PREFIX_MODEL_IMAGES, user.user_id, image).await?;
            image_urls.push(url);
        }
        let sample_video_url = match video {
            Some(video) => {
                Some(upload::store(&mut batch, PREFIX_MODEL_VIDEOS, user.user_id, video).await?)
            }
            None => None,
        };

        let input = CreateModelProfile {
            user_id: user.user_id,
            name,
            gender: gender.as_str().to_string(),
            bio,
            portfolio,
            instagram_id,
            sample_video_url,
            image_urls,
            primary_index,
        };
        ModelRepo::create_with_gallery(&state.pool, &input)
            .await
            .map_err(|err| match err {
                sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                    profile_exists()
                }
                other => AppError::Database(other),
            })
    }
    .await;
    let detail = upload::settle(batch, result).await?;

    tracing::info!(
        model_id = detail.profile.id,
        user_id = user.user_id,
        images = detail.images.len(),
        "Model profile created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: detail })))
}

/// GET /api/v1/models/me
pub async fn get_mine(
    State(state): State<AppState>,
    RequireModel(user): RequireModel,
) -> AppResult<Json<DataResponse<ModelProfileDetail>>> {
    let profile = find_own_profile(&state, user.user_id).await?;
    let detail = ModelRepo::with_gallery(&state.pool, profile).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// PUT /api/v1/models/me
///
/// Multipart edit. Every text field is optional and only the fields present
/// are changed. A `sample_video` part replaces the current sample video; the
/// old object is deleted once the update has committed.
pub async fn update_mine(
    State(state): State<AppState>,
    RequireModel(user): RequireModel,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<ModelProfileDetail>>> {
    let profile = find_own_profile(&state, user.user_id).await?;
    let mut form = MultipartForm::read(multipart, &["sample_video"]).await?;

    // Blank fields mean "unchanged", like an untouched input on an edit form.
    let mut input = UpdateModelProfile {
        name: non_blank(form.text("name")).map(validate_name).transpose()?,
        gender: non_blank(form.text("gender"))
            .map(|g| Gender::parse(g).map(|g| g.as_str().to_string()))
            .transpose()?,
        bio: normalize_text(form.text("bio"), MAX_BIO_LENGTH, "Bio")?,
        portfolio: normalize_portfolio(form.text("portfolio"))?,
        instagram_id: normalize_instagram(form.text("instagram_id"))?,
        sample_video_url: None,
    };
    let video = form
        .take_file("sample_video")?
        .map(|file| validate_file(file, MediaKind::Video))
        .transpose()?;

    if input.is_empty() && video.is_none() {
        return Err(AppError::BadRequest("No profile fields to update".into()));
    }

    let mut batch = UploadBatch::new(Arc::clone(&state.media));
    let result: AppResult<ProfileUpdate> = async {
        if let Some(video) = video {
            input.sample_video_url =
                Some(upload::store(&mut batch, PREFIX_MODEL_VIDEOS, user.user_id, video).await?);
        }
        ModelRepo::update(&state.pool, profile.id, &input)
            .await?
            .ok_or_else(|| profile_not_found(profile.id))
    }
    .await;
    let updated = upload::settle(batch, result).await?;

    if let Some(old_video) = updated.replaced_video.as_deref() {
        purge_urls(state.media.as_ref(), [old_video]).await;
    }

    tracing::info!(model_id = profile.id, user_id = user.user_id, "Model profile updated");

    let detail = ModelRepo::with_gallery(&state.pool, updated.profile).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// DELETE /api/v1/models/me
///
/// Removes the profile, its gallery rows and every stored asset. Returns 204.
pub async fn delete_mine(
    State(state): State<AppState>,
    RequireModel(user): RequireModel,
) -> AppResult<StatusCode> {
    let detail = ModelRepo::delete_for_user(&state.pool, user.user_id)
        .await?
        .ok_or_else(|| no_profile(user.user_id))?;

    let urls = detail
        .images
        .iter()
        .map(|image| image.image_url.as_str())
        .chain(detail.profile.sample_video_url.as_deref());
    let failed = purge_urls(state.media.as_ref(), urls).await;

    tracing::info!(
        model_id = detail.profile.id,
        user_id = user.user_id,
        failed_asset_deletes = failed,
        "Model profile deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/models/{id}
///
/// Recruiters may view any profile; a model may view only their own.
pub async fn get_by_id(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ModelProfileDetail>>> {
    let profile = ModelRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| profile_not_found(id))?;

    let is_owner = profile.user_id == auth_user.user_id;
    if auth_user.role.is_creative() && !is_owner {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only recruiters can view other profiles".into(),
        )));
    }

    let detail = ModelRepo::with_gallery(&state.pool, profile).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// GET /api/v1/models?gender=&limit=&offset=
///
/// Recruiter catalogue of model profiles, newest first.
pub async fn list(
    State(state): State<AppState>,
    RequireRecruiter(_recruiter): RequireRecruiter,
    Query(params): Query<ModelCatalogueParams>,
) -> AppResult<Json<PageResponse<ModelProfile>>> {
    let gender = non_blank(params.gender.as_deref())
        .map(Gender::parse)
        .transpose()?;
    let gender = gender.map(Gender::as_str);
    let limit = clamp_limit(params.limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);
    let offset = clamp_offset(params.offset);

    let data = ModelRepo::list(&state.pool, gender, limit, offset).await?;
    let total = ModelRepo::count(&state.pool, gender).await?;

    Ok(Json(PageResponse {
        data,
        total,
        limit,
        offset,
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load the caller's own profile, or 404.
pub(crate) async fn find_own_profile(state: &AppState, user_id: DbId) -> AppResult<ModelProfile> {
    ModelRepo::find_by_user(&state.pool, user_id)
        .await?
        .ok_or_else(|| no_profile(user_id))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// `primary_image` is an index into the uploaded images; absent means the first.
fn parse_primary_index(value: Option<&str>) -> AppResult<usize> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(0),
        Some(raw) => raw.parse().map_err(|_| {
            AppError::Core(CoreError::Validation(format!(
                "primary_image must be a non-negative index, got '{raw}'"
            )))
        }),
    }
}

fn profile_exists() -> AppError {
    AppError::Core(CoreError::Conflict("A model profile already exists for this user".into()))
}

fn profile_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "ModelProfile",
        id,
    })
}

fn no_profile(user_id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "ModelProfile for user",
        id: user_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_index_defaults_to_first_image() {
        assert_eq!(parse_primary_index(None).unwrap(), 0);
        assert_eq!(parse_primary_index(Some("  ")).unwrap(), 0);
        assert_eq!(parse_primary_index(Some("3")).unwrap(), 3);
    }

    #[test]
    fn blank_values_are_skipped() {
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some(" male ")), Some(" male "));
    }

    #[test]
    fn primary_index_rejects_garbage() {
        assert!(parse_primary_index(Some("-1")).is_err());
        assert!(parse_primary_index(Some("first")).is_err());
    }
}
