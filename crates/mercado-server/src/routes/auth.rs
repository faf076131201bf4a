//! Registration, login, and profile routes.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use mercado_auth::{LoginInput, RegisterInput, SessionClaims};
use mercado_core::models::user::PublicUser;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::ApiError;
use crate::extract::AuthSession;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or email; the field keeps its historical wire name.
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: PublicUser,
}

/// `POST /api/auth/register`
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    if req.username.trim().is_empty() || req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest("Missing registration fields".into()));
    }

    state
        .auth
        .register(RegisterInput {
            username: req.username,
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully" })),
    ))
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest("Missing login fields".into()));
    }

    let output = state
        .auth
        .login(LoginInput {
            username_or_email: req.email,
            password: req.password,
        })
        .await?;

    Ok(Json(LoginResponse {
        message: "Login successful".into(),
        token: output.token,
        user: output.user,
    }))
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub message: String,
    pub user: SessionClaims,
}

/// `GET /api/auth/profile` — echoes the verified claims back to the
/// caller; any valid session is sufficient.
pub async fn profile(AuthSession(claims): AuthSession) -> Json<ProfileResponse> {
    Json(ProfileResponse {
        message: "Access granted".into(),
        user: claims,
    })
}
