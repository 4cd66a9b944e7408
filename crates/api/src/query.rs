//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Generic pagination parameters (`?limit=&offset=`).
///
/// Values are clamped with `castlane_core::pagination` before reaching the
/// repository layer.
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query parameters for the model catalogue (`?gender=&limit=&offset=`).
#[derive(Debug, Deserialize)]
pub struct ModelCatalogueParams {
    pub gender: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
