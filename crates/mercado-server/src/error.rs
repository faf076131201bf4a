//! Unified API error handling.
//!
//! Every route handler returns `Result<T, ApiError>`. Errors are
//! translated to an HTTP status with a `{"message": ...}` body at this
//! single boundary; server-side failures are logged with detail but
//! surfaced to the client as a generic message.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mercado_auth::AuthError;
use mercado_core::MercadoError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Authentication or authorization failure.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// Missing or malformed input, user-correctable.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Referenced entity absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// Unique-identifier conflict.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Authorization denied for a verified caller.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Storage or other internal failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<MercadoError> for ApiError {
    fn from(err: MercadoError) -> Self {
        match err {
            MercadoError::Validation { message } => Self::BadRequest(message),
            MercadoError::NotFound { entity, .. } => Self::NotFound(format!("{entity} not found")),
            MercadoError::AlreadyExists { entity } => {
                Self::Conflict(format!("{entity} already registered"))
            }
            MercadoError::AuthenticationFailed { .. } => Self::Auth(AuthError::InvalidCredentials),
            MercadoError::AuthorizationDenied { .. } => {
                Self::Forbidden("Access denied: administrator role required".to_string())
            }
            MercadoError::Database(msg) | MercadoError::Crypto(msg) | MercadoError::Internal(msg) => {
                Self::Internal(msg)
            }
        }
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Auth(err) => match err {
                AuthError::MissingToken | AuthError::InvalidCredentials => {
                    StatusCode::UNAUTHORIZED
                }
                AuthError::TokenExpired
                | AuthError::TokenInvalid(_)
                | AuthError::InsufficientRole { .. } => StatusCode::FORBIDDEN,
                AuthError::Crypto(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Internal detail never leaves the process.
    fn message(&self) -> String {
        match self {
            Self::Auth(err) => match err {
                AuthError::MissingToken => "No token provided".to_string(),
                AuthError::InvalidCredentials => "Invalid username/email or password".to_string(),
                AuthError::TokenExpired | AuthError::TokenInvalid(_) => {
                    "Invalid or expired token".to_string()
                }
                AuthError::InsufficientRole { .. } => {
                    "Access denied: administrator role required".to_string()
                }
                AuthError::Crypto(_) => "Internal server error".to_string(),
            },
            Self::BadRequest(msg) | Self::NotFound(msg) | Self::Conflict(msg)
            | Self::Forbidden(msg) => msg.clone(),
            Self::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }

        (status, Json(json!({ "message": self.message() }))).into_response()
    }
}
