//! Handlers for editor showreel uploads (`/editor/uploads`, `/editors/uploads`).

use std::sync::Arc;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use castlane_core::error::CoreError;
use castlane_core::media::{MediaKind, PREFIX_EDITOR_VIDEOS};
use castlane_core::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use castlane_core::profile::normalize_text;
use castlane_core::types::DbId;
use castlane_db::models::editor_upload::{CreateEditorUpload, EditorUpload, EditorUploadListing};
use castlane_db::repositories::EditorUploadRepo;
use castlane_storage::{purge_urls, UploadBatch};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireEditor, RequireRecruiter};
use crate::query::PaginationParams;
use crate::response::{DataResponse, PageResponse};
use crate::state::AppState;
use crate::upload::{self, validate_file, MultipartForm};

/// Maximum length of an upload title.
const MAX_TITLE_LENGTH: usize = 200;

/// Maximum length of an upload description.
const MAX_DESCRIPTION_LENGTH: usize = 2000;

/// POST /api/v1/editor/uploads
///
/// Multipart `title`, optional `description`, and a single `video` file.
pub async fn create(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<EditorUpload>>)> {
    let mut form = MultipartForm::read(multipart, &["video"]).await?;

    let title = normalize_text(Some(form.required_text("title")?), MAX_TITLE_LENGTH, "Title")?
        .ok_or_else(|| AppError::Core(CoreError::Validation("Title must not be empty".into())))?;
    let description = normalize_text(
        form.text("description"),
        MAX_DESCRIPTION_LENGTH,
        "Description",
    )?;
    let video = form.take_file("video")?.ok_or_else(|| {
        AppError::Core(CoreError::Validation("Missing required file 'video'".into()))
    })?;
    let video = validate_file(video, MediaKind::Video)?;

    let mut batch = UploadBatch::new(Arc::clone(&state.media));
    let result: AppResult<EditorUpload> = async {
        let video_url = upload::store(&mut batch, PREFIX_EDITOR_VIDEOS, user.user_id, video).await?;
        let input = CreateEditorUpload {
            user_id: user.user_id,
            title,
            description,
            video_url,
        };
        Ok(EditorUploadRepo::create(&state.pool, &input).await?)
    }
    .await;
    let upload = upload::settle(batch, result).await?;

    tracing::info!(upload_id = upload.id, user_id = user.user_id, "Editor upload created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: upload })))
}

/// GET /api/v1/editor/uploads
pub async fn list_mine(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
) -> AppResult<Json<DataResponse<Vec<EditorUpload>>>> {
    let uploads = EditorUploadRepo::list_by_user(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: uploads }))
}

/// DELETE /api/v1/editor/uploads/{id}
///
/// Only the owning editor may delete an upload. Returns 204.
pub async fn delete(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let upload = EditorUploadRepo::delete_for_user(&state.pool, user.user_id, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "EditorUpload",
                id,
            })
        })?;

    purge_urls(state.media.as_ref(), [upload.video_url.as_str()]).await;
    tracing::info!(upload_id = id, user_id = user.user_id, "Editor upload deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/editors/uploads?limit=&offset=
///
/// Recruiter view of every editor upload, newest first.
pub async fn list_all(
    State(state): State<AppState>,
    RequireRecruiter(_recruiter): RequireRecruiter,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<PageResponse<EditorUploadListing>>> {
    let limit = clamp_limit(params.limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);
    let offset = clamp_offset(params.offset);

    let data = EditorUploadRepo::list(&state.pool, limit, offset).await?;
    let total = EditorUploadRepo::count(&state.pool).await?;

    Ok(Json(PageResponse {
        data,
        total,
        limit,
        offset,
    }))
}
