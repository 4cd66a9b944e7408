//! Repository for the `editor_uploads` table.

use castlane_core::types::DbId;
use sqlx::MySqlPool;

use crate::models::editor_upload::{CreateEditorUpload, EditorUpload, EditorUploadListing};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, title, description, video_url, created_at";

/// Provides CRUD operations for editor uploads.
pub struct EditorUploadRepo;

impl EditorUploadRepo {
    /// Insert an upload and mark the editor as having a profile.
    pub async fn create(
        pool: &MySqlPool,
        input: &CreateEditorUpload,
    ) -> Result<EditorUpload, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO editor_uploads (user_id, title, description, video_url) VALUES (?, ?, ?, ?)",
        )
        .bind(input.user_id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.video_url)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE users SET has_profile = TRUE WHERE id = ?")
            .bind(input.user_id)
            .execute(&mut *tx)
            .await?;

        let query = format!("SELECT {COLUMNS} FROM editor_uploads WHERE id = ?");
        let upload = sqlx::query_as::<_, EditorUpload>(&query)
            .bind(result.last_insert_id() as DbId)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(upload)
    }

    /// Find an upload by internal ID.
    pub async fn find_by_id(pool: &MySqlPool, id: DbId) -> Result<Option<EditorUpload>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM editor_uploads WHERE id = ?");
        sqlx::query_as::<_, EditorUpload>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List one editor's uploads, newest first.
    pub async fn list_by_user(
        pool: &MySqlPool,
        user_id: DbId,
    ) -> Result<Vec<EditorUpload>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM editor_uploads WHERE user_id = ? ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, EditorUpload>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// List all uploads with their editor's name, newest first.
    pub async fn list(
        pool: &MySqlPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<EditorUploadListing>, sqlx::Error> {
        sqlx::query_as::<_, EditorUploadListing>(
            "SELECT e.id, e.user_id, e.title, e.description, e.video_url, e.created_at,
                    u.name AS editor_name
             FROM editor_uploads e
             JOIN users u ON u.id = e.user_id
             ORDER BY e.created_at DESC, e.id DESC
             LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Count all uploads.
    pub async fn count(pool: &MySqlPool) -> Result<i64, sqlx::Error> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM editor_uploads")
            .fetch_one(pool)
            .await?;
        Ok(total)
    }

    /// Delete an upload owned by `user_id`.
    ///
    /// Clears `users.has_profile` when it was the editor's last upload.
    /// Returns the deleted row, or `None` if the user owns no such upload.
    pub async fn delete_for_user(
        pool: &MySqlPool,
        user_id: DbId,
        id: DbId,
    ) -> Result<Option<EditorUpload>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM editor_uploads WHERE id = ? AND user_id = ? FOR UPDATE");
        let Some(upload) = sqlx::query_as::<_, EditorUpload>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM editor_uploads WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let (remaining,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM editor_uploads WHERE user_id = ?")
                .bind(user_id)
                .fetch_one(&mut *tx)
                .await?;
        if remaining == 0 {
            sqlx::query("UPDATE users SET has_profile = FALSE WHERE id = ?")
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(Some(upload))
    }
}
