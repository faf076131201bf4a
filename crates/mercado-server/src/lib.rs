//! Mercado Server — HTTP API and chat relay.
//!
//! Request flow: bearer token verification → role gate → catalog
//! store. WebSocket connections verify the same token at connect time
//! and then talk to the chat relay, which persists each message before
//! fanning it out to every active connection.

use std::path::Path;

use axum::Router;
use axum::routing::{get, post, put};
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use state::AppState;

/// Assemble the full application router: the JSON API under `/api`,
/// the chat relay at `/ws`, uploaded images under `/uploads`, and the
/// static client with an index fallback for unmatched paths.
pub fn router(state: AppState, public_dir: &Path) -> Router {
    let index = ServeFile::new(public_dir.join("index.html"));
    let static_files = ServeDir::new(public_dir).not_found_service(index);

    Router::new()
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/profile", get(routes::auth::profile))
        .route(
            "/api/products",
            get(routes::products::list).post(routes::products::create),
        )
        .route(
            "/api/products/{id}",
            put(routes::products::update).delete(routes::products::remove),
        )
        .route("/ws", get(routes::chat::ws_handler))
        .nest_service("/uploads", ServeDir::new(&state.uploads_dir))
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
