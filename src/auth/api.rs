//! Authentication API Endpoints
//! Mission: Provide signup, login and current-session endpoints

use crate::api::{error::ApiError, AppState};
use crate::auth::{
    middleware::AuthPayload,
    models::{CreateUserRequest, LoginRequest, LoginResponse, Payload, UserResponse, UserRole},
    password::{check_password, hash_password},
};
use crate::db::{CreateUserParams, DbError};
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use tracing::{error, info, warn};

/// Signup endpoint - POST /v1/users/signup
///
/// Self-registered accounts always get the `user` role.
pub async fn signup(
    State(state): State<AppState>,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let Json(req) = body?;
    req.validate().map_err(ApiError::BadRequest)?;

    // bcrypt is CPU-bound; keep it off the async workers
    let password = req.password.clone();
    let hashed_password = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| {
            error!("Password hashing task failed: {}", e);
            ApiError::Internal
        })?
        .map_err(|e| {
            error!("Failed to hash password: {:#}", e);
            ApiError::Internal
        })?;

    let user = state
        .store
        .create_user(&CreateUserParams {
            username: req.username,
            hashed_password,
            full_name: req.full_name,
            email: req.email,
            role: UserRole::User,
        })
        .map_err(|e| {
            if matches!(e, DbError::UniqueViolation) {
                warn!("Signup rejected, username or email taken");
            }
            ApiError::from(e)
        })?;

    info!("✅ User created: {}", user.username);

    Ok(Json(UserResponse::from_user(&user)))
}

/// Login endpoint - POST /v1/users/login
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(req) = body?;
    req.validate().map_err(ApiError::BadRequest)?;

    info!("🔐 Login attempt: {}", req.username);

    let user = state.store.get_user(&req.username).map_err(|e| {
        if matches!(e, DbError::NotFound) {
            warn!("❌ Login for unknown user: {}", req.username);
        }
        ApiError::from(e)
    })?;

    let password = req.password.clone();
    let hashed_password = user.hashed_password.clone();
    let password_matches =
        tokio::task::spawn_blocking(move || check_password(&password, &hashed_password).is_ok())
            .await
            .map_err(|e| {
                error!("Password check task failed: {}", e);
                ApiError::Internal
            })?;

    if !password_matches {
        warn!("❌ Failed login attempt: {}", req.username);
        return Err(ApiError::Unauthorized(
            "invalid username or password".to_string(),
        ));
    }

    let (access_token, payload) = state
        .token_maker
        .create_token(&user.username, user.role, state.access_token_duration)
        .map_err(|e| {
            error!("Failed to issue access token: {}", e);
            ApiError::Internal
        })?;

    info!(
        "✅ Login successful: {} ({})",
        user.username,
        user.role.as_str()
    );

    Ok(Json(LoginResponse {
        access_token_id: payload.id(),
        access_token,
        access_token_expires_at: payload.expired_at(),
        user: UserResponse::from_user(&user),
    }))
}

/// Current session - GET /v1/users/me
///
/// Answers from the verified token alone, no store lookup.
pub async fn me(AuthPayload(payload): AuthPayload) -> Json<Payload> {
    Json(payload)
}
