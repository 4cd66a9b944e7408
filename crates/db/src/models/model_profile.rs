//! Model profile entity model and DTOs.

use castlane_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use super::model_image::ModelImage;

/// A row from the `models` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ModelProfile {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub gender: String,
    pub bio: Option<String>,
    pub portfolio: Option<String>,
    pub instagram_id: Option<String>,
    /// URL of the profile picture; always one of the gallery's `image_url`s.
    pub image: Option<String>,
    pub sample_video_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A profile together with its ordered gallery.
#[derive(Debug, Clone, Serialize)]
pub struct ModelProfileDetail {
    #[serde(flatten)]
    pub profile: ModelProfile,
    pub images: Vec<ModelImage>,
}

/// DTO for creating a model profile. Media URLs are already in the object store.
#[derive(Debug, Clone)]
pub struct CreateModelProfile {
    pub user_id: DbId,
    pub name: String,
    pub gender: String,
    pub bio: Option<String>,
    pub portfolio: Option<String>,
    pub instagram_id: Option<String>,
    pub sample_video_url: Option<String>,
    /// Gallery image URLs in display order.
    pub image_urls: Vec<String>,
    /// Index into `image_urls` of the profile picture.
    pub primary_index: usize,
}

/// DTO for editing a profile. Only non-`None` fields are applied.
#[derive(Debug, Clone, Default)]
pub struct UpdateModelProfile {
    pub name: Option<String>,
    pub gender: Option<String>,
    pub bio: Option<String>,
    pub portfolio: Option<String>,
    pub instagram_id: Option<String>,
    /// URL of a newly uploaded sample video.
    pub sample_video_url: Option<String>,
}

impl UpdateModelProfile {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.gender.is_none()
            && self.bio.is_none()
            && self.portfolio.is_none()
            && self.instagram_id.is_none()
            && self.sample_video_url.is_none()
    }
}

/// Result of [`crate::repositories::ModelRepo::update`].
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub profile: ModelProfile,
    /// The sample video URL that was overwritten, if any. Its object can be
    /// removed once the update has committed.
    pub replaced_video: Option<String>,
}
