//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! match. Use these in route handlers to enforce authorization at the type
//! level.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use castlane_core::error::CoreError;
use castlane_core::roles::Role;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

async fn require_role(
    parts: &mut Parts,
    state: &AppState,
    role: Role,
) -> Result<AuthUser, AppError> {
    let user = AuthUser::from_request_parts(parts, state).await?;
    if user.role != role {
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "{} role required",
            role.as_str()
        ))));
    }
    Ok(user)
}

/// Requires the `model` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn my_profile(RequireModel(user): RequireModel) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireModel(pub AuthUser);

impl FromRequestParts<AppState> for RequireModel {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(parts, state, Role::Model).await.map(RequireModel)
    }
}

/// Requires the `editor` role. Rejects with 403 Forbidden otherwise.
pub struct RequireEditor(pub AuthUser);

impl FromRequestParts<AppState> for RequireEditor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(parts, state, Role::Editor).await.map(RequireEditor)
    }
}

/// Requires the `recruiter` role. Rejects with 403 Forbidden otherwise.
///
/// Guards the catalogue of creative profiles.
pub struct RequireRecruiter(pub AuthUser);

impl FromRequestParts<AppState> for RequireRecruiter {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(parts, state, Role::Recruiter)
            .await
            .map(RequireRecruiter)
    }
}
