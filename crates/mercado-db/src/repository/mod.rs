//! SurrealDB repository implementations.

mod chat_message;
mod product;
mod user;

pub use chat_message::SurrealChatMessageRepository;
pub use product::SurrealProductRepository;
pub use user::SurrealUserRepository;
