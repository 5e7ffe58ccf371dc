use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::api::errors::ApiError;
use crate::api::state::AppState;
use crate::auth::jwt::verify_token;

/// JWT authentication extractor for protected routes
///
/// Usage:
/// ```rust,ignore
/// async fn protected_handler(
///     JwtAuth(user_id): JwtAuth,
/// ) -> Result<String, ApiError> {
///     Ok(format!("Hello user {}", user_id))
/// }
/// ```
pub struct JwtAuth(pub i64);

/// Like [`JwtAuth`] but lets anonymous visitors through
///
/// A present but invalid token is still rejected.
pub struct MaybeAuth(pub Option<i64>);

fn bearer_token(parts: &Parts) -> Result<Option<&str>, ApiError> {
    let Some(header) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let value = header
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid authorization header"))?;

    value
        .strip_prefix("Bearer ")
        .map(Some)
        .ok_or_else(|| ApiError::unauthorized("Invalid authorization format. Use: Bearer <token>"))
}

fn user_id_from_token(token: &str, secret: &str) -> Result<i64, ApiError> {
    verify_token(token, secret)
        .map(|claims| claims.sub)
        .map_err(|e| ApiError::unauthorized(format!("Invalid token: {}", e)))
}

#[async_trait]
impl<S> FromRequestParts<S> for JwtAuth
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?
            .ok_or_else(|| ApiError::unauthorized("Missing authorization header"))?;

        let app_state = AppState::from_ref(state);
        let user_id = user_id_from_token(token, &app_state.config.jwt_secret)?;

        Ok(JwtAuth(user_id))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for MaybeAuth
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts)? else {
            return Ok(MaybeAuth(None));
        };

        let app_state = AppState::from_ref(state);
        let user_id = user_id_from_token(token, &app_state.config.jwt_secret)?;

        Ok(MaybeAuth(Some(user_id)))
    }
}
