//! Chat message domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One entry in the append-only chat log. Immutable once created;
/// `created_at` is assigned by the store on insert and defines the
/// total order of the log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub username: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateChatMessage {
    /// Authenticated username of the sender — never client-supplied.
    pub username: String,
    pub text: String,
}
