//! Mercado server — application entry point.

use mercado_server::{AppState, ServerConfig, router};
use mercado_db::DbManager;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("mercado=info".parse().unwrap()),
        )
        .json()
        .init();

    let config = ServerConfig::from_env().expect("Failed to load configuration");

    let manager = DbManager::connect(&config.db)
        .await
        .expect("Failed to connect to SurrealDB");
    mercado_db::run_migrations(manager.client())
        .await
        .expect("Failed to run migrations");

    let state = AppState::new(
        manager.client().clone(),
        config.auth.clone(),
        config.uploads_dir.clone(),
    );

    // One-time idempotent bootstrap: exactly one administrator account
    // must exist before the service accepts connections.
    state
        .auth
        .ensure_bootstrap_admin(
            &config.admin_username,
            &config.admin_email,
            &config.admin_password,
        )
        .await
        .expect("Failed to ensure bootstrap admin");

    tokio::fs::create_dir_all(&config.uploads_dir)
        .await
        .expect("Failed to create uploads directory");

    let app = router(state, &config.public_dir);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!(addr = %config.bind_addr, "Mercado server listening");

    axum::serve(listener, app)
        .await
        .expect("Server terminated unexpectedly");
}
