//! Authentication and authorization error types.

use mercado_core::error::MercadoError;
use mercado_core::models::user::Role;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("no token provided")]
    MissingToken,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("insufficient role: {required} required")]
    InsufficientRole { required: Role },

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for MercadoError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::MissingToken
            | AuthError::TokenExpired
            | AuthError::TokenInvalid(_) => MercadoError::AuthenticationFailed {
                reason: err.to_string(),
            },
            AuthError::InsufficientRole { .. } => MercadoError::AuthorizationDenied {
                reason: err.to_string(),
            },
            AuthError::Crypto(msg) => MercadoError::Crypto(msg),
        }
    }
}
