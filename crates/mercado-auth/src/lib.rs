//! Mercado Auth — password verification, JWT session token
//! issuance/validation, and role-based authorization.
//!
//! The session boundary defined here is shared by the HTTP API and the
//! WebSocket chat relay: both verify the same token shape against the
//! same secret.

pub mod authz;
pub mod config;
pub mod error;
pub mod password;
pub mod service;
pub mod token;

pub use authz::require_role;
pub use config::AuthConfig;
pub use error::AuthError;
pub use service::{AuthService, LoginInput, LoginOutput, RegisterInput};
pub use token::SessionClaims;
