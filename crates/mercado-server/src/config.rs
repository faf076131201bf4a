//! Server configuration loaded from the environment.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use mercado_auth::AuthConfig;
use mercado_db::DbConfig;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Process configuration for the Mercado server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    pub bind_addr: SocketAddr,
    pub db: DbConfig,
    pub auth: AuthConfig,
    /// Bootstrap administrator identity. Exactly one admin account is
    /// ensured at startup, keyed on this email.
    pub admin_username: String,
    pub admin_email: String,
    pub admin_password: String,
    /// Directory served as the static client.
    pub public_dir: PathBuf,
    /// Directory uploaded product images are written to.
    pub uploads_dir: PathBuf,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to
    /// development defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env_or("HOST", "0.0.0.0");
        let port: u16 = env_or("PORT", "4000")
            .parse()
            .map_err(|e| ConfigError::Invalid {
                key: "PORT",
                message: format!("{e}"),
            })?;
        let bind_addr = format!("{host}:{port}")
            .parse()
            .map_err(|e| ConfigError::Invalid {
                key: "HOST",
                message: format!("{e}"),
            })?;

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) => {
                warn!("JWT_SECRET not set; using an insecure development default");
                "clave_super_segura".to_string()
            }
        };

        let db = DbConfig {
            url: env_or("SURREAL_URL", "ws://127.0.0.1:8000"),
            namespace: env_or("SURREAL_NS", "mercado"),
            database: env_or("SURREAL_DB", "main"),
            username: env_or("SURREAL_USER", "root"),
            password: env_or("SURREAL_PASS", "root"),
        };

        let auth = AuthConfig {
            jwt_secret,
            pepper: env::var("PASSWORD_PEPPER").ok(),
            ..Default::default()
        };

        Ok(Self {
            bind_addr,
            db,
            auth,
            admin_username: env_or("ADMIN_USERNAME", "lydia"),
            admin_email: env_or("ADMIN_EMAIL", "lydia@example.com"),
            admin_password: env_or("ADMIN_PASSWORD", "1234"),
            public_dir: PathBuf::from(env_or("PUBLIC_DIR", "public")),
            uploads_dir: PathBuf::from(env_or("UPLOADS_DIR", "public/uploads")),
        })
    }
}
