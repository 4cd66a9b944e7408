//! Repository for the `model_images` table (profile galleries).

use castlane_core::types::DbId;
use sqlx::MySqlPool;

use crate::models::model_image::ModelImage;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, model_id, image_url, position, created_at";

/// Result of [`ModelImageRepo::append`].
#[derive(Debug)]
pub enum AppendOutcome {
    /// Images were added; holds the full gallery afterwards.
    Appended(Vec<ModelImage>),
    /// Adding the images would exceed the limit; nothing was written.
    LimitExceeded { existing: usize },
    /// The model does not exist.
    ModelNotFound,
}

/// Result of [`ModelImageRepo::delete_unless_primary`].
#[derive(Debug)]
pub enum DeleteImageOutcome {
    Deleted(ModelImage),
    /// The image is the current profile picture and was kept.
    IsPrimary,
    /// No such image in this model's gallery.
    NotFound,
}

/// Provides gallery operations for model profiles.
pub struct ModelImageRepo;

impl ModelImageRepo {
    /// List a model's gallery in display order.
    pub async fn list_by_model(
        pool: &MySqlPool,
        model_id: DbId,
    ) -> Result<Vec<ModelImage>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM model_images WHERE model_id = ? ORDER BY position, id");
        sqlx::query_as::<_, ModelImage>(&query)
            .bind(model_id)
            .fetch_all(pool)
            .await
    }

    /// Count the images in a model's gallery.
    pub async fn count_by_model(pool: &MySqlPool, model_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM model_images WHERE model_id = ?")
                .bind(model_id)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }

    /// Append images to the end of a gallery without exceeding `max_images`.
    ///
    /// The model row is locked for the duration of the transaction so
    /// concurrent appends cannot both pass the limit check.
    pub async fn append(
        pool: &MySqlPool,
        model_id: DbId,
        image_urls: &[String],
        max_images: usize,
    ) -> Result<AppendOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let locked: Option<(DbId,)> = sqlx::query_as("SELECT id FROM models WHERE id = ? FOR UPDATE")
            .bind(model_id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Ok(AppendOutcome::ModelNotFound);
        }

        let (existing, max_position): (i64, Option<i32>) = sqlx::query_as(
            "SELECT COUNT(*), MAX(position) FROM model_images WHERE model_id = ?",
        )
        .bind(model_id)
        .fetch_one(&mut *tx)
        .await?;
        let existing = existing as usize;

        if existing + image_urls.len() > max_images {
            return Ok(AppendOutcome::LimitExceeded { existing });
        }

        let mut next_position = max_position.map_or(0, |p| p + 1);
        for url in image_urls {
            sqlx::query("INSERT INTO model_images (model_id, image_url, position) VALUES (?, ?, ?)")
                .bind(model_id)
                .bind(url)
                .bind(next_position)
                .execute(&mut *tx)
                .await?;
            next_position += 1;
        }

        let query =
            format!("SELECT {COLUMNS} FROM model_images WHERE model_id = ? ORDER BY position, id");
        let gallery = sqlx::query_as::<_, ModelImage>(&query)
            .bind(model_id)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(AppendOutcome::Appended(gallery))
    }

    /// Delete one gallery image unless it is the current profile picture.
    pub async fn delete_unless_primary(
        pool: &MySqlPool,
        model_id: DbId,
        image_id: DbId,
    ) -> Result<DeleteImageOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let primary: Option<(Option<String>,)> =
            sqlx::query_as("SELECT image FROM models WHERE id = ? FOR UPDATE")
                .bind(model_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((primary,)) = primary else {
            return Ok(DeleteImageOutcome::NotFound);
        };

        let query = format!("SELECT {COLUMNS} FROM model_images WHERE id = ? AND model_id = ?");
        let Some(image) = sqlx::query_as::<_, ModelImage>(&query)
            .bind(image_id)
            .bind(model_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(DeleteImageOutcome::NotFound);
        };

        if primary.as_deref() == Some(image.image_url.as_str()) {
            return Ok(DeleteImageOutcome::IsPrimary);
        }

        sqlx::query("DELETE FROM model_images WHERE id = ?")
            .bind(image.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(DeleteImageOutcome::Deleted(image))
    }
}
