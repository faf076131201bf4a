//! Shared test setup: in-memory database, state, and router.

use std::path::{Path, PathBuf};

use axum::Router;
use mercado_auth::AuthConfig;
use mercado_server::{AppState, router};
use surrealdb::engine::any;
use uuid::Uuid;

pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "test-secret".into(),
        ..Default::default()
    }
}

/// Fresh state over an in-memory database, with a unique scratch
/// uploads directory and the bootstrap admin already provisioned.
pub async fn test_state() -> AppState {
    let db = any::connect("mem://").await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    mercado_db::run_migrations(&db).await.unwrap();

    let uploads: PathBuf = std::env::temp_dir().join(format!("mercado-uploads-{}", Uuid::new_v4()));
    let state = AppState::new(db, test_auth_config(), uploads);

    state
        .auth
        .ensure_bootstrap_admin("lydia", "lydia@example.com", "1234")
        .await
        .unwrap();

    state
}

pub fn test_app(state: AppState) -> Router {
    // The static dir is irrelevant here; API routes take precedence.
    router(state, Path::new("public"))
}
