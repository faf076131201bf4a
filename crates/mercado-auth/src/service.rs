//! Authentication service — registration, login, and bootstrap-admin
//! provisioning.

use mercado_core::error::{MercadoError, MercadoResult};
use mercado_core::models::user::{CreateUser, PublicUser, Role, User};
use mercado_core::repository::UserRepository;
use tracing::info;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token;

/// Input for the registration flow.
#[derive(Debug)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Input for the login flow. The identifier is matched against
/// usernames first, then emails.
#[derive(Debug)]
pub struct LoginInput {
    pub username_or_email: String,
    pub password: String,
}

/// Successful login result.
#[derive(Debug)]
pub struct LoginOutput {
    /// Signed JWT session token.
    pub token: String,
    /// Public-safe fields of the authenticated user.
    pub user: PublicUser,
    /// Token lifetime in seconds.
    pub expires_in: u64,
}

/// Authentication service.
///
/// Generic over the user repository so that the auth layer has no
/// dependency on the database crate.
pub struct AuthService<U: UserRepository> {
    user_repo: U,
    config: AuthConfig,
}

impl<U: UserRepository> AuthService<U> {
    pub fn new(user_repo: U, config: AuthConfig) -> Self {
        Self { user_repo, config }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Register a new account. Always created with [`Role::User`] —
    /// there is no way to register an administrator.
    pub async fn register(&self, input: RegisterInput) -> MercadoResult<PublicUser> {
        if input.username.trim().is_empty() || input.email.trim().is_empty() {
            return Err(MercadoError::Validation {
                message: "username and email are required".into(),
            });
        }
        if input.password.len() < self.config.min_password_length {
            return Err(MercadoError::Validation {
                message: format!(
                    "password must be at least {} characters",
                    self.config.min_password_length
                ),
            });
        }

        // Reject duplicates on either unique identifier up front; the
        // store's unique indexes remain the final arbiter under races.
        // Only an explicit miss clears a lookup: any other storage
        // error propagates instead of masquerading as "available".
        match self.user_repo.get_by_username(&input.username).await {
            Ok(_) => {
                return Err(MercadoError::AlreadyExists {
                    entity: "user".into(),
                });
            }
            Err(MercadoError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }
        match self.user_repo.get_by_email(&input.email).await {
            Ok(_) => {
                return Err(MercadoError::AlreadyExists {
                    entity: "user".into(),
                });
            }
            Err(MercadoError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        let user = self
            .user_repo
            .create(CreateUser {
                username: input.username,
                email: input.email,
                password: input.password,
                role: Role::User,
            })
            .await?;

        info!(username = %user.username, "user registered");
        Ok(PublicUser::from(&user))
    }

    /// Authenticate with username-or-email + password and issue a
    /// session token.
    ///
    /// Both "no such user" and "wrong password" collapse into
    /// [`AuthError::InvalidCredentials`] — no detail leaks about which
    /// half failed.
    pub async fn login(&self, input: LoginInput) -> MercadoResult<LoginOutput> {
        let user = self.lookup(&input.username_or_email).await?;

        let valid = password::verify_password(
            &input.password,
            &user.password_hash,
            self.config.pepper.as_deref(),
        )
        .map_err(|e| MercadoError::Crypto(e.to_string()))?;

        if !valid {
            return Err(AuthError::InvalidCredentials.into());
        }

        let token = token::issue_session_token(user.id, &user.username, user.role, &self.config)?;

        Ok(LoginOutput {
            token,
            user: PublicUser::from(&user),
            expires_in: self.config.token_lifetime_secs,
        })
    }

    async fn lookup(&self, username_or_email: &str) -> MercadoResult<User> {
        match self.user_repo.get_by_username(username_or_email).await {
            Ok(u) => Ok(u),
            Err(MercadoError::NotFound { .. }) => self
                .user_repo
                .get_by_email(username_or_email)
                .await
                .map_err(|e| match e {
                    MercadoError::NotFound { .. } => AuthError::InvalidCredentials.into(),
                    other => other,
                }),
            Err(e) => Err(e),
        }
    }

    /// Idempotent startup step: make sure the one administrator
    /// account exists, creating it if absent.
    ///
    /// Keyed on the fixed admin email; the unique index on `email`
    /// guards against a concurrent duplicate. Must be invoked once
    /// before the service starts accepting connections.
    pub async fn ensure_bootstrap_admin(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> MercadoResult<User> {
        match self.user_repo.get_by_email(email).await {
            Ok(existing) => {
                info!(email = %email, "bootstrap admin already exists");
                Ok(existing)
            }
            Err(MercadoError::NotFound { .. }) => {
                let admin = self
                    .user_repo
                    .create(CreateUser {
                        username: username.to_string(),
                        email: email.to_string(),
                        password: password.to_string(),
                        role: Role::Admin,
                    })
                    .await?;
                info!(email = %email, "bootstrap admin created");
                Ok(admin)
            }
            Err(e) => Err(e),
        }
    }
}
