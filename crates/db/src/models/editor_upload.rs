//! Editor upload entity model and DTOs.

use castlane_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `editor_uploads` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EditorUpload {
    pub id: DbId,
    pub user_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub video_url: String,
    pub created_at: Timestamp,
}

/// DTO for creating an editor upload. `video_url` is already in the object store.
#[derive(Debug, Clone)]
pub struct CreateEditorUpload {
    pub user_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub video_url: String,
}

/// An upload joined with its editor's display name, for the recruiter catalogue.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EditorUploadListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub upload: EditorUpload,
    pub editor_name: String,
}
