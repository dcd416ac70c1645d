use async_trait::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::{header, request::Parts};

use crate::api::errors::ApiError;
use crate::core::{security, state::AppState};
use crate::repositories::users::User;

pub(crate) struct CurrentUser(pub(crate) User);

/// The authenticated user together with the bearer token they presented.
pub(crate) struct CurrentSession {
    pub(crate) user: User,
    pub(crate) token: String,
    pub(crate) expires_at: i64,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let State(app_state) = State::<AppState>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to access application state"))?;

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

        let claims = security::verify_token(token, app_state.settings().security())
            .map_err(|_| ApiError::Unauthorized("Invalid authentication credentials"))?;

        if app_state.users().is_revoked(token).await {
            return Err(ApiError::Unauthorized("Session has been logged out"));
        }

        let Some(user) = app_state.users().find_by_id(&claims.sub).await else {
            return Err(ApiError::Unauthorized("User not found"));
        };

        Ok(CurrentSession { user, token: token.to_string(), expires_at: claims.exp })
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentSession { user, .. } = CurrentSession::from_request_parts(parts, state).await?;
        Ok(CurrentUser(user))
    }
}
