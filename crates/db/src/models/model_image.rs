//! Gallery image entity model.

use castlane_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `model_images` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ModelImage {
    pub id: DbId,
    pub model_id: DbId,
    pub image_url: String,
    pub position: i32,
    pub created_at: Timestamp,
}
