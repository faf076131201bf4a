//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async and single-record; the
//! underlying store is treated as an opaque document database.

use uuid::Uuid;

use crate::error::MercadoResult;
use crate::models::{
    chat::{ChatMessage, CreateChatMessage},
    product::{CreateProduct, Product, UpdateProduct},
    user::{CreateUser, User},
};

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = MercadoResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = MercadoResult<User>> + Send;
    fn get_by_username(&self, username: &str) -> impl Future<Output = MercadoResult<User>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = MercadoResult<User>> + Send;
}

pub trait ProductRepository: Send + Sync {
    fn create(&self, input: CreateProduct) -> impl Future<Output = MercadoResult<Product>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = MercadoResult<Product>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateProduct,
    ) -> impl Future<Output = MercadoResult<Product>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = MercadoResult<()>> + Send;
    /// The whole catalog, oldest first. Intentionally unpaginated.
    fn list(&self) -> impl Future<Output = MercadoResult<Vec<Product>>> + Send;
}

pub trait ChatMessageRepository: Send + Sync {
    /// Append a message to the log. The store assigns `id` and
    /// `created_at`; the returned record is the durable form that gets
    /// broadcast.
    fn append(
        &self,
        input: CreateChatMessage,
    ) -> impl Future<Output = MercadoResult<ChatMessage>> + Send;
    /// The most recent `limit` messages, ordered oldest to newest.
    fn recent(&self, limit: usize) -> impl Future<Output = MercadoResult<Vec<ChatMessage>>> + Send;
}
