//! Authentication configuration.

/// Configuration for the authentication service.
///
/// The same instance (in particular the same `jwt_secret`) must be
/// handed to both the HTTP layer and the chat relay so that tokens
/// verify identically in both contexts.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Shared secret for HS256 JWT signing and verification.
    pub jwt_secret: String,
    /// Session token lifetime in seconds (default: 7200 = 2 hours).
    pub token_lifetime_secs: u64,
    /// Optional pepper prepended to passwords before Argon2id
    /// hashing/verification. Must match the pepper used at hash time.
    pub pepper: Option<String>,
    /// Minimum password length accepted at registration.
    pub min_password_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_lifetime_secs: 7200,
            pepper: None,
            min_password_length: 4,
        }
    }
}
