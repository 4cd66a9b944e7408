//! Bearer-token authentication extractor.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use castlane_core::error::CoreError;
use castlane_core::roles::Role;
use castlane_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// The caller behind a valid access token.
///
/// Extracting it rejects the request with 401 when the `Authorization`
/// header is missing or malformed, the token fails validation, or the token
/// names a role this server does not know.
///
/// ```ignore
/// async fn whoami(user: AuthUser) -> AppResult<Json<DbId>> {
///     tracing::debug!(user_id = user.user_id, role = %user.role, "whoami");
///     Ok(Json(user.user_id))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// `users.id`, taken from `claims.sub`.
    pub user_id: DbId,
    pub role: Role,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;

        let claims = validate_token(token, &state.config.jwt)
            .map_err(|_| unauthorized("Invalid or expired token"))?;

        // Tokens outlive deployments; a role dropped since issue is refused.
        let role = Role::parse(&claims.role).map_err(|_| unauthorized("Unknown role in token"))?;

        Ok(AuthUser {
            user_id: claims.sub,
            role,
        })
    }
}

/// Pull the token out of `Authorization: Bearer <token>`.
fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| unauthorized("Missing Authorization header"))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| unauthorized("Invalid Authorization format. Expected: Bearer <token>"))
}

fn unauthorized(message: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(message.into()))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use axum::http::HeaderValue;

    use super::*;

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn bearer_token_is_extracted() {
        assert_eq!(bearer_token(&headers("Bearer abc.def")).unwrap(), "abc.def");
    }

    #[test]
    fn missing_or_malformed_header_is_unauthorized() {
        assert_matches!(
            bearer_token(&HeaderMap::new()),
            Err(AppError::Core(CoreError::Unauthorized(msg))) if msg.contains("Missing")
        );
        assert_matches!(
            bearer_token(&headers("Basic dXNlcjpwYXNz")),
            Err(AppError::Core(CoreError::Unauthorized(_)))
        );
        assert_matches!(
            bearer_token(&headers("Bearer ")),
            Err(AppError::Core(CoreError::Unauthorized(_)))
        );
    }
}
