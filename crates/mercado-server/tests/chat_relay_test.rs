//! End-to-end chat relay tests over real WebSocket connections.
//!
//! Each test binds an ephemeral listener, serves the full router and
//! drives one or more `tokio-tungstenite` clients against `/ws`.

mod common;

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use mercado_auth::token::issue_session_token;
use mercado_core::models::chat::CreateChatMessage;
use mercado_core::models::user::Role;
use mercado_core::repository::ChatMessageRepository;
use mercado_server::AppState;
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use uuid::Uuid;

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn serve(state: AppState) -> SocketAddr {
    let app = common::test_app(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn session_token(state: &AppState, username: &str) -> String {
    issue_session_token(Uuid::new_v4(), username, Role::User, state.auth.config()).unwrap()
}

async fn connect(addr: SocketAddr, token: &str) -> Client {
    let (client, _) = connect_async(format!("ws://{addr}/ws?token={token}"))
        .await
        .unwrap();
    client
}

/// Receive the next text frame within a deadline and parse it.
async fn next_event(client: &mut Client) -> Value {
    let frame = timeout(Duration::from_secs(5), client.next())
        .await
        .expect("timed out waiting for a frame")
        .expect("connection closed")
        .unwrap();
    match frame {
        Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
        other => panic!("expected a text frame, got {other:?}"),
    }
}

async fn seed_message(state: &AppState, username: &str, text: &str) {
    state
        .chat
        .append(CreateChatMessage {
            username: username.into(),
            text: text.into(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn handshake_requires_a_valid_token() {
    let state = common::test_state().await;
    let addr = serve(state).await;

    let err = connect_async(format!("ws://{addr}/ws"))
        .await
        .expect_err("handshake without a token must fail");
    match err {
        tungstenite::Error::Http(response) => assert_eq!(response.status(), 401),
        other => panic!("expected an HTTP rejection, got {other:?}"),
    }

    let err = connect_async(format!("ws://{addr}/ws?token=garbage"))
        .await
        .expect_err("handshake with a bad token must fail");
    match err {
        tungstenite::Error::Http(response) => assert_eq!(response.status(), 403),
        other => panic!("expected an HTTP rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn history_is_replayed_oldest_first_on_connect() {
    let state = common::test_state().await;
    seed_message(&state, "alice", "first").await;
    seed_message(&state, "bob", "second").await;
    seed_message(&state, "alice", "third").await;

    let token = session_token(&state, "carol");
    let addr = serve(state).await;
    let mut client = connect(addr, &token).await;

    let event = next_event(&mut client).await;
    assert_eq!(event["event"], "chat history");
    let history = event["data"].as_array().unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0]["username"], "alice");
    assert_eq!(history[0]["text"], "first");
    assert_eq!(history[2]["text"], "third");
}

#[tokio::test]
async fn history_replay_is_capped() {
    let state = common::test_state().await;
    for i in 0..105 {
        seed_message(&state, "alice", &format!("msg {i}")).await;
    }

    let token = session_token(&state, "bob");
    let addr = serve(state).await;
    let mut client = connect(addr, &token).await;

    let event = next_event(&mut client).await;
    assert_eq!(event["event"], "chat history");
    let history = event["data"].as_array().unwrap();
    assert_eq!(history.len(), 100);
    // The oldest five fell off; the newest survives at the end.
    assert_eq!(history[0]["text"], "msg 5");
    assert_eq!(history[99]["text"], "msg 104");
}

#[tokio::test]
async fn messages_fan_out_to_every_connection() {
    let state = common::test_state().await;
    let alice_token = session_token(&state, "alice");
    let bob_token = session_token(&state, "bob");
    let addr = serve(state).await;

    let mut alice = connect(addr, &alice_token).await;
    let mut bob = connect(addr, &bob_token).await;
    assert_eq!(next_event(&mut alice).await["event"], "chat history");
    assert_eq!(next_event(&mut bob).await["event"], "chat history");

    alice.send(Message::Text("hi".into())).await.unwrap();

    for client in [&mut alice, &mut bob] {
        let event = next_event(client).await;
        assert_eq!(event["event"], "chat message");
        assert_eq!(event["data"]["username"], "alice");
        assert_eq!(event["data"]["text"], "hi");
    }
}

#[tokio::test]
async fn sender_identity_comes_from_the_session() {
    let state = common::test_state().await;
    let alice_token = session_token(&state, "alice");
    let addr = serve(state).await;

    let mut alice = connect(addr, &alice_token).await;
    assert_eq!(next_event(&mut alice).await["event"], "chat history");

    // A spoofed username in the payload is discarded.
    alice
        .send(Message::Text(
            r#"{"username":"mallory","text":"spoof"}"#.into(),
        ))
        .await
        .unwrap();

    let event = next_event(&mut alice).await;
    assert_eq!(event["event"], "chat message");
    assert_eq!(event["data"]["username"], "alice");
    assert_eq!(event["data"]["text"], "spoof");
}

#[tokio::test]
async fn empty_messages_are_dropped() {
    let state = common::test_state().await;
    let token = session_token(&state, "alice");
    let addr = serve(state).await;

    let mut client = connect(addr, &token).await;
    assert_eq!(next_event(&mut client).await["event"], "chat history");

    client
        .send(Message::Text(r#"{"text":"   "}"#.into()))
        .await
        .unwrap();
    client.send(Message::Text("real".into())).await.unwrap();

    // The blank message produced nothing; the next frame is "real".
    let event = next_event(&mut client).await;
    assert_eq!(event["event"], "chat message");
    assert_eq!(event["data"]["text"], "real");
}

#[tokio::test]
async fn sent_messages_are_persisted() {
    let state = common::test_state().await;
    let token = session_token(&state, "alice");
    let addr = serve(state.clone()).await;

    let mut client = connect(addr, &token).await;
    assert_eq!(next_event(&mut client).await["event"], "chat history");

    client.send(Message::Text("for the record".into())).await.unwrap();
    let event = next_event(&mut client).await;
    assert_eq!(event["data"]["text"], "for the record");

    // A later connection replays it.
    let late_token = session_token(&state, "bob");
    let mut late = connect(addr, &late_token).await;
    let event = next_event(&mut late).await;
    assert_eq!(event["event"], "chat history");
    let history = event["data"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["username"], "alice");
    assert_eq!(history[0]["text"], "for the record");
}
