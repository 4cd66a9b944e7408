//! Repository for the `models` table.

use castlane_core::types::DbId;
use sqlx::{MySql, MySqlPool, Transaction};

use crate::models::model_image::ModelImage;
use crate::models::model_profile::{
    CreateModelProfile, ModelProfile, ModelProfileDetail, ProfileUpdate, UpdateModelProfile,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, name, gender, bio, portfolio, instagram_id, image, \
                       sample_video_url, created_at, updated_at";

/// Gallery column list; kept in sync with `model_image_repo`.
const IMAGE_COLUMNS: &str = "id, model_id, image_url, position, created_at";

/// Provides CRUD operations for model profiles.
pub struct ModelRepo;

impl ModelRepo {
    /// Create a profile and its gallery in one transaction.
    ///
    /// Inserts the `models` row, one `model_images` row per URL (in order),
    /// points `models.image` at `image_urls[primary_index]`, and sets
    /// `users.has_profile`. Nothing is persisted if any step fails.
    ///
    /// A second profile for the same user surfaces as a unique-violation
    /// database error on `uq_models_user_id`.
    pub async fn create_with_gallery(
        pool: &MySqlPool,
        input: &CreateModelProfile,
    ) -> Result<ModelProfileDetail, sqlx::Error> {
        let primary_url = input
            .image_urls
            .get(input.primary_index)
            .ok_or_else(|| {
                sqlx::Error::Protocol(format!(
                    "primary_index {} out of range for {} images",
                    input.primary_index,
                    input.image_urls.len()
                ))
            })?
            .clone();

        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO models
                (user_id, name, gender, bio, portfolio, instagram_id, sample_video_url)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(input.user_id)
        .bind(&input.name)
        .bind(&input.gender)
        .bind(&input.bio)
        .bind(&input.portfolio)
        .bind(&input.instagram_id)
        .bind(&input.sample_video_url)
        .execute(&mut *tx)
        .await?;
        let model_id = result.last_insert_id() as DbId;

        for (position, url) in input.image_urls.iter().enumerate() {
            sqlx::query("INSERT INTO model_images (model_id, image_url, position) VALUES (?, ?, ?)")
                .bind(model_id)
                .bind(url)
                .bind(position as i32)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("UPDATE models SET image = ? WHERE id = ?")
            .bind(&primary_url)
            .bind(model_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE users SET has_profile = TRUE WHERE id = ?")
            .bind(input.user_id)
            .execute(&mut *tx)
            .await?;

        let detail = Self::load_detail(&mut tx, model_id).await?;
        tx.commit().await?;

        tracing::debug!(model_id, user_id = input.user_id, "Model profile created");
        Ok(detail)
    }

    /// Find a profile by internal ID.
    pub async fn find_by_id(pool: &MySqlPool, id: DbId) -> Result<Option<ModelProfile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM models WHERE id = ?");
        sqlx::query_as::<_, ModelProfile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the profile owned by `user_id` (at most one exists).
    pub async fn find_by_user(
        pool: &MySqlPool,
        user_id: DbId,
    ) -> Result<Option<ModelProfile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM models WHERE user_id = ?");
        sqlx::query_as::<_, ModelProfile>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Attach the ordered gallery to a profile.
    pub async fn with_gallery(
        pool: &MySqlPool,
        profile: ModelProfile,
    ) -> Result<ModelProfileDetail, sqlx::Error> {
        let query = format!(
            "SELECT {IMAGE_COLUMNS} FROM model_images WHERE model_id = ? ORDER BY position, id"
        );
        let images = sqlx::query_as::<_, ModelImage>(&query)
            .bind(profile.id)
            .fetch_all(pool)
            .await?;
        Ok(ModelProfileDetail { profile, images })
    }

    /// List profiles for the catalogue, newest first, optionally filtered by gender.
    pub async fn list(
        pool: &MySqlPool,
        gender: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ModelProfile>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM models
             WHERE (? IS NULL OR gender = ?)
             ORDER BY created_at DESC, id DESC
             LIMIT ? OFFSET ?"
        );
        sqlx::query_as::<_, ModelProfile>(&query)
            .bind(gender)
            .bind(gender)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count profiles matching the same filter as [`ModelRepo::list`].
    pub async fn count(pool: &MySqlPool, gender: Option<&str>) -> Result<i64, sqlx::Error> {
        let (total,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM models WHERE (? IS NULL OR gender = ?)")
                .bind(gender)
                .bind(gender)
                .fetch_one(pool)
                .await?;
        Ok(total)
    }

    /// Update a profile. Only non-`None` fields in `input` are applied.
    ///
    /// Returns the updated row together with the sample video URL that was
    /// replaced (if `input.sample_video_url` was set and a previous video
    /// existed), or `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &MySqlPool,
        id: DbId,
        input: &UpdateModelProfile,
    ) -> Result<Option<ProfileUpdate>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let previous: Option<(Option<String>,)> =
            sqlx::query_as("SELECT sample_video_url FROM models WHERE id = ? FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((previous_video,)) = previous else {
            return Ok(None);
        };

        sqlx::query(
            "UPDATE models SET
                name = COALESCE(?, name),
                gender = COALESCE(?, gender),
                bio = COALESCE(?, bio),
                portfolio = COALESCE(?, portfolio),
                instagram_id = COALESCE(?, instagram_id),
                sample_video_url = COALESCE(?, sample_video_url)
             WHERE id = ?",
        )
        .bind(&input.name)
        .bind(&input.gender)
        .bind(&input.bio)
        .bind(&input.portfolio)
        .bind(&input.instagram_id)
        .bind(&input.sample_video_url)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let query = format!("SELECT {COLUMNS} FROM models WHERE id = ?");
        let profile = sqlx::query_as::<_, ModelProfile>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        let replaced_video = previous_video.filter(|_| input.sample_video_url.is_some());
        Ok(Some(ProfileUpdate {
            profile,
            replaced_video,
        }))
    }

    /// Point the profile picture at one of the model's own gallery images.
    ///
    /// Returns `None` if `image_id` is not in this model's gallery.
    pub async fn set_primary_image(
        pool: &MySqlPool,
        model_id: DbId,
        image_id: DbId,
    ) -> Result<Option<ModelProfile>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        // Same lock as `ModelImageRepo::delete_unless_primary`, taken before
        // the gallery read so a concurrently deleted image is never chosen.
        let locked: Option<(DbId,)> = sqlx::query_as("SELECT id FROM models WHERE id = ? FOR UPDATE")
            .bind(model_id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Ok(None);
        }

        let url: Option<(String,)> =
            sqlx::query_as(
                "SELECT image_url FROM model_images WHERE id = ? AND model_id = ? FOR UPDATE",
            )
                .bind(image_id)
                .bind(model_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((url,)) = url else {
            return Ok(None);
        };

        sqlx::query("UPDATE models SET image = ? WHERE id = ?")
            .bind(&url)
            .bind(model_id)
            .execute(&mut *tx)
            .await?;

        let query = format!("SELECT {COLUMNS} FROM models WHERE id = ?");
        let profile = sqlx::query_as::<_, ModelProfile>(&query)
            .bind(model_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(profile))
    }

    /// Delete the profile owned by `user_id` together with its gallery rows,
    /// and clear `users.has_profile`.
    ///
    /// Returns the deleted profile and gallery so the caller can remove the
    /// stored media, or `None` if the user had no profile.
    pub async fn delete_for_user(
        pool: &MySqlPool,
        user_id: DbId,
    ) -> Result<Option<ModelProfileDetail>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM models WHERE user_id = ? FOR UPDATE");
        let Some(profile) = sqlx::query_as::<_, ModelProfile>(&query)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };
        let detail = Self::load_detail(&mut tx, profile.id).await?;

        sqlx::query("DELETE FROM model_images WHERE model_id = ?")
            .bind(profile.id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM models WHERE id = ?")
            .bind(profile.id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE users SET has_profile = FALSE WHERE id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(detail))
    }

    async fn load_detail(
        tx: &mut Transaction<'_, MySql>,
        model_id: DbId,
    ) -> Result<ModelProfileDetail, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM models WHERE id = ?");
        let profile = sqlx::query_as::<_, ModelProfile>(&query)
            .bind(model_id)
            .fetch_one(&mut **tx)
            .await?;

        let query = format!(
            "SELECT {IMAGE_COLUMNS} FROM model_images WHERE model_id = ? ORDER BY position, id"
        );
        let images = sqlx::query_as::<_, ModelImage>(&query)
            .bind(model_id)
            .fetch_all(&mut **tx)
            .await?;

        Ok(ModelProfileDetail { profile, images })
    }
}
