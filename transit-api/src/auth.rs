use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use transit_core::{password, IdentityError};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::issue_token;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub message: String,
    pub username: String,
    pub user_id: Uuid,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register/", post(register))
        .route("/login/", post(login))
}

// ============================================================================
// Handlers
// ============================================================================

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let username = req.username.trim();
    if username.is_empty() {
        return Err(AppError::ValidationError("username must not be empty".to_string()));
    }
    if req.password.is_empty() {
        return Err(AppError::ValidationError("password must not be empty".to_string()));
    }
    if !req.email.contains('@') {
        return Err(AppError::ValidationError("email is not valid".to_string()));
    }

    let hash = password::hash_password(&req.password);
    let user = state
        .identity
        .create_user(username, &req.email, &hash)
        .await
        .map_err(AppError::identity)?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: user.id,
            username: user.username,
            email: user.email,
        }),
    ))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let record = state
        .identity
        .find_by_username(&req.username)
        .await
        .map_err(AppError::identity)?
        .filter(|r| password::verify_password(&req.password, &r.password_hash))
        .ok_or_else(|| AppError::identity(IdentityError::InvalidCredentials))?;

    let user = record.user();
    let token = issue_token(&user, &state.auth)?;

    Ok(Json(LoginResponse {
        token,
        message: "Login Successful".to_string(),
        username: user.username,
        user_id: user.id,
    }))
}
