//! Request-level session extraction.

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use mercado_auth::token::decode_session_token;
use mercado_auth::{AuthError, SessionClaims};

use crate::error::ApiError;
use crate::state::AppState;

/// Verified session claims extracted from the `Authorization: Bearer`
/// header. Missing header → 401; bad or expired token → 403. The same
/// verification (same secret, same claim shape) runs at WebSocket
/// connect time in the chat relay.
pub struct AuthSession(pub SessionClaims);

impl FromRequestParts<AppState> for AuthSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(ApiError::Auth(AuthError::MissingToken))?;

        let claims = decode_session_token(token, state.auth.config())?;
        Ok(AuthSession(claims))
    }
}
