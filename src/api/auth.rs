use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentSession, CurrentUser};
use crate::api::validation::validate_password_len;
use crate::core::security;
use crate::core::state::AppState;
use crate::repositories::users::{CreateUser, User, UserStoreError};
use crate::schemas::auth::TokenResponse;
use crate::schemas::user::{LoginRequest, RegisterRequest, UserResponse};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("name must not be blank".to_string()));
    }
    validate_password_len(&payload.password)?;

    let hashed_password = security::hash_password(&payload.password)
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;

    let user = state
        .users()
        .create(CreateUser {
            name: &payload.name,
            email: &payload.email,
            role: payload.role,
            hashed_password,
        })
        .await
        .map_err(|err| match err {
            UserStoreError::EmailTaken => {
                ApiError::Conflict("User with this email already exists".to_string())
            }
        })?;

    tracing::info!(user_id = %user.id, role = ?user.role, "User registered");

    Ok((StatusCode::CREATED, Json(issue_token(&state, user)?)))
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Some(user) = state.users().find_by_email(&payload.email).await else {
        return Err(ApiError::Unauthorized("Incorrect email or password"));
    };

    let verified = security::verify_password(&payload.password, &user.hashed_password)
        .map_err(|_| ApiError::Unauthorized("Incorrect email or password"))?;
    if !verified {
        return Err(ApiError::Unauthorized("Incorrect email or password"));
    }
    if payload.role.is_some_and(|role| role != user.role) {
        return Err(ApiError::Unauthorized("Incorrect email or password"));
    }

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(issue_token(&state, user)?))
}

/// Revokes the presented token and walks away from any open practice session
/// or upload batch, cancelling their pending stages.
async fn logout(
    State(state): State<AppState>,
    session: CurrentSession,
) -> Result<StatusCode, ApiError> {
    let user_id = session.user.id;
    state.users().revoke_token(&session.token, session.expires_at).await;

    state
        .practice()
        .with_existing(&user_id, |slot| {
            slot.cancel_pending();
            slot.desk.reset();
        })
        .await;
    state
        .uploads()
        .with_existing(&user_id, |slot| {
            slot.cancel_pending();
            slot.desk.discard();
        })
        .await;

    tracing::info!(user_id = %user_id, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}

async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from_user(user))
}

fn issue_token(state: &AppState, user: User) -> Result<TokenResponse, ApiError> {
    let access_token = security::create_access_token(&user.id, state.settings().security(), None)
        .map_err(|e| ApiError::internal(e, "Failed to create access token"))?;

    Ok(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
        user: UserResponse::from_user(user),
    })
}
