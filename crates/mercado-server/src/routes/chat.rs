//! The chat relay.
//!
//! Connection lifecycle: the session token is verified before the
//! WebSocket upgrade (missing → 401, invalid/expired → 403, no frames
//! exchanged either way). On success the verified claims are bound to
//! the connection; the relay replays the most recent history privately
//! to the new participant and then enters the active loop, persisting
//! each inbound message before fanning it out to every active
//! connection through the shared broadcast channel.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use chrono::{DateTime, Utc};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use mercado_auth::token::decode_session_token;
use mercado_auth::{AuthError, SessionClaims};
use mercado_core::models::chat::{ChatMessage, CreateChatMessage};
use mercado_core::repository::ChatMessageRepository;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::error::ApiError;
use crate::state::AppState;

/// How many persisted messages a newly joined connection receives.
const HISTORY_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct ConnectParams {
    pub token: Option<String>,
}

/// Broadcast payload: exactly the public fields of a persisted
/// message. Record ids stay internal.
#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    username: &'a str,
    text: &'a str,
    created_at: DateTime<Utc>,
}

impl<'a> From<&'a ChatMessage> for WireMessage<'a> {
    fn from(message: &'a ChatMessage) -> Self {
        Self {
            username: &message.username,
            text: &message.text,
            created_at: message.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct Event<T> {
    event: &'static str,
    data: T,
}

async fn send_event<T: Serialize>(
    sink: &mut SplitSink<WebSocket, Message>,
    event: &Event<T>,
) -> Result<(), axum::Error> {
    let payload = serde_json::to_string(event).map_err(axum::Error::new)?;
    sink.send(Message::Text(payload.into())).await
}

/// Interpret an inbound text frame as a chat message.
///
/// Accepted forms: a JSON string, a JSON object with a `text` field,
/// or a plain non-JSON text frame taken verbatim. Anything else — and
/// any empty or whitespace-only text — yields `None` and is silently
/// ignored (not an error).
fn parse_inbound_text(raw: &str) -> Option<String> {
    let text = match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::String(s)) => s,
        Ok(serde_json::Value::Object(map)) => map.get("text")?.as_str()?.to_string(),
        Ok(_) => return None,
        Err(_) => raw.to_string(),
    };

    if text.trim().is_empty() { None } else { Some(text) }
}

/// Persist an accepted message, then hand it to the broadcast channel.
///
/// At-most-once: when the store rejects the write, the message is
/// logged and dropped — nothing is broadcast and the sender is not
/// told. Awaiting the write before returning keeps one sender's
/// messages in order and means a disconnect noticed later cannot
/// abort it.
async fn persist_and_broadcast<R: ChatMessageRepository>(
    chat: &R,
    chat_tx: &broadcast::Sender<ChatMessage>,
    username: &str,
    text: String,
) {
    match chat
        .append(CreateChatMessage {
            username: username.to_string(),
            text,
        })
        .await
    {
        Ok(saved) => {
            // Fails only with zero subscribers; a live connection
            // always holds one.
            let _ = chat_tx.send(saved);
        }
        Err(e) => {
            error!(username = %username, error = %e,
                "failed to persist chat message; broadcast suppressed");
        }
    }
}

/// `GET /ws?token=...` — authenticate, then upgrade into the relay.
pub async fn ws_handler(
    State(state): State<AppState>,
    Query(params): Query<ConnectParams>,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let token = params
        .token
        .ok_or(ApiError::Auth(AuthError::MissingToken))?;
    let claims = decode_session_token(&token, state.auth.config())?;

    Ok(ws.on_upgrade(move |socket| relay(socket, state, claims)))
}

/// Per-connection relay loop, running until the peer disconnects.
///
/// The claims stay bound to the connection for its whole lifetime:
/// every persisted message is stamped with the authenticated username,
/// never with anything the client supplies.
async fn relay(socket: WebSocket, state: AppState, claims: SessionClaims) {
    let username = claims.username;
    info!(username = %username, "chat connection established");

    // Subscribe before replaying history so no message can fall into
    // the gap between the two.
    let mut rx = state.chat_tx.subscribe();
    let (mut sink, mut stream) = socket.split();

    // Private history replay to this connection only, oldest first.
    match state.chat.recent(HISTORY_LIMIT).await {
        Ok(history) => {
            let wire: Vec<WireMessage> = history.iter().map(WireMessage::from).collect();
            let event = Event {
                event: "chat history",
                data: wire,
            };
            if send_event(&mut sink, &event).await.is_err() {
                return;
            }
        }
        // Best effort: the connection stays up without a replay.
        Err(e) => error!(username = %username, error = %e, "failed to load chat history"),
    }

    loop {
        tokio::select! {
            inbound = stream.next() => {
                match inbound {
                    Some(Ok(Message::Text(raw))) => {
                        let Some(text) = parse_inbound_text(raw.as_str()) else {
                            continue;
                        };
                        persist_and_broadcast(&state.chat, &state.chat_tx, &username, text).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {} // binary/ping/pong: nothing to do
                    Some(Err(e)) => {
                        debug!(username = %username, error = %e, "chat transport error");
                        break;
                    }
                }
            }
            outbound = rx.recv() => {
                match outbound {
                    Ok(message) => {
                        let event = Event {
                            event: "chat message",
                            data: WireMessage::from(&message),
                        };
                        if send_event(&mut sink, &event).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(username = %username, skipped, "chat subscriber lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    info!(username = %username, "chat connection closed");
}

#[cfg(test)]
mod tests {
    use super::{parse_inbound_text, persist_and_broadcast};
    use chrono::Utc;
    use mercado_core::error::{MercadoError, MercadoResult};
    use mercado_core::models::chat::{ChatMessage, CreateChatMessage};
    use mercado_core::repository::ChatMessageRepository;
    use tokio::sync::broadcast;
    use uuid::Uuid;

    /// Stub log that accepts every append, stamping id and timestamp
    /// the way the store would.
    struct AcceptingLog;

    impl ChatMessageRepository for AcceptingLog {
        async fn append(&self, input: CreateChatMessage) -> MercadoResult<ChatMessage> {
            Ok(ChatMessage {
                id: Uuid::new_v4(),
                username: input.username,
                text: input.text,
                created_at: Utc::now(),
            })
        }
        async fn recent(&self, _limit: usize) -> MercadoResult<Vec<ChatMessage>> {
            Ok(Vec::new())
        }
    }

    /// Stub log whose writes always fail.
    struct FailingLog;

    impl ChatMessageRepository for FailingLog {
        async fn append(&self, _input: CreateChatMessage) -> MercadoResult<ChatMessage> {
            Err(MercadoError::Database("disk full".into()))
        }
        async fn recent(&self, _limit: usize) -> MercadoResult<Vec<ChatMessage>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn persisted_message_is_broadcast() {
        let (tx, mut rx) = broadcast::channel(8);

        persist_and_broadcast(&AcceptingLog, &tx, "alice", "hi".into()).await;

        let message = rx.try_recv().unwrap();
        assert_eq!(message.username, "alice");
        assert_eq!(message.text, "hi");
    }

    #[tokio::test]
    async fn storage_failure_suppresses_broadcast() {
        let (tx, mut rx) = broadcast::channel(8);

        persist_and_broadcast(&FailingLog, &tx, "alice", "lost".into()).await;

        // Nothing reaches subscribers when the write failed.
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[test]
    fn accepts_json_string() {
        assert_eq!(parse_inbound_text("\"hi\""), Some("hi".to_string()));
    }

    #[test]
    fn accepts_object_with_text_field() {
        assert_eq!(
            parse_inbound_text(r#"{"text": "hello there"}"#),
            Some("hello there".to_string())
        );
    }

    #[test]
    fn accepts_plain_text_frame() {
        assert_eq!(parse_inbound_text("hi"), Some("hi".to_string()));
    }

    #[test]
    fn ignores_empty_text() {
        assert_eq!(parse_inbound_text("\"\""), None);
        assert_eq!(parse_inbound_text(r#"{"text": ""}"#), None);
        assert_eq!(parse_inbound_text(r#"{"text": "   "}"#), None);
        assert_eq!(parse_inbound_text(""), None);
    }

    #[test]
    fn ignores_object_without_text() {
        assert_eq!(parse_inbound_text(r#"{"username": "mallory"}"#), None);
    }

    #[test]
    fn ignores_non_string_payloads() {
        assert_eq!(parse_inbound_text("42"), None);
        assert_eq!(parse_inbound_text("[1, 2]"), None);
        assert_eq!(parse_inbound_text(r#"{"text": 42}"#), None);
    }
}
