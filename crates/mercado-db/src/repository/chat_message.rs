//! SurrealDB implementation of [`ChatMessageRepository`].
//!
//! The chat log is append-only. `created_at` is assigned server-side
//! by the table's `DEFAULT time::now()` at insert time, which defines
//! the total order used for history replay.

use chrono::{DateTime, Utc};
use mercado_core::error::MercadoResult;
use mercado_core::models::chat::{ChatMessage, CreateChatMessage};
use mercado_core::repository::ChatMessageRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ChatMessageRow {
    username: String,
    text: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct ChatMessageRowWithId {
    record_id: String,
    username: String,
    text: String,
    created_at: DateTime<Utc>,
}

impl ChatMessageRow {
    fn into_message(self, id: Uuid) -> ChatMessage {
        ChatMessage {
            id,
            username: self.username,
            text: self.text,
            created_at: self.created_at,
        }
    }
}

impl ChatMessageRowWithId {
    fn try_into_message(self) -> Result<ChatMessage, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        Ok(ChatMessage {
            id,
            username: self.username,
            text: self.text,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the chat message repository.
#[derive(Clone)]
pub struct SurrealChatMessageRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealChatMessageRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ChatMessageRepository for SurrealChatMessageRepository<C> {
    async fn append(&self, input: CreateChatMessage) -> MercadoResult<ChatMessage> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('chat_message', $id) SET \
                 username = $username, text = $text",
            )
            .bind(("id", id_str.clone()))
            .bind(("username", input.username))
            .bind(("text", input.text))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<ChatMessageRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "chat_message".into(),
            id: id_str,
        })?;

        Ok(row.into_message(id))
    }

    async fn recent(&self, limit: usize) -> MercadoResult<Vec<ChatMessage>> {
        // Newest first to apply the limit, then reversed so callers
        // always see oldest-to-newest.
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM chat_message \
                 ORDER BY created_at DESC LIMIT $limit",
            )
            .bind(("limit", limit as u64))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ChatMessageRowWithId> = result.take(0).map_err(DbError::from)?;
        let mut messages = rows
            .into_iter()
            .map(ChatMessageRowWithId::try_into_message)
            .collect::<Result<Vec<_>, _>>()?;
        messages.reverse();

        Ok(messages)
    }
}
