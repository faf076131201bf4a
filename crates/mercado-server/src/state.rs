//! Shared application state.

use std::path::PathBuf;
use std::sync::Arc;

use mercado_auth::{AuthConfig, AuthService};
use mercado_core::models::chat::ChatMessage;
use mercado_db::repository::{
    SurrealChatMessageRepository, SurrealProductRepository, SurrealUserRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use tokio::sync::broadcast;

/// Capacity of the chat fan-out channel. Slow subscribers past this
/// many pending messages start lagging and skip ahead.
const CHAT_CHANNEL_CAPACITY: usize = 256;

/// State shared by every request handler and chat connection.
#[derive(Clone)]
pub struct AppState {
    pub users: SurrealUserRepository<Any>,
    pub products: SurrealProductRepository<Any>,
    pub chat: SurrealChatMessageRepository<Any>,
    pub auth: Arc<AuthService<SurrealUserRepository<Any>>>,
    /// Single in-process fan-out channel for chat broadcast. Messages
    /// are sent here only after they have been durably persisted.
    pub chat_tx: broadcast::Sender<ChatMessage>,
    pub uploads_dir: PathBuf,
}

impl AppState {
    pub fn new(db: Surreal<Any>, auth_config: AuthConfig, uploads_dir: PathBuf) -> Self {
        let users = match &auth_config.pepper {
            Some(pepper) => SurrealUserRepository::with_pepper(db.clone(), pepper.clone()),
            None => SurrealUserRepository::new(db.clone()),
        };
        let (chat_tx, _) = broadcast::channel(CHAT_CHANNEL_CAPACITY);

        Self {
            users: users.clone(),
            products: SurrealProductRepository::new(db.clone()),
            chat: SurrealChatMessageRepository::new(db),
            auth: Arc::new(AuthService::new(users, auth_config)),
            chat_tx,
            uploads_dir,
        }
    }
}
