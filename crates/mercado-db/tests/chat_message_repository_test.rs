//! Integration tests for the chat message repository using in-memory
//! SurrealDB.

use mercado_core::models::chat::CreateChatMessage;
use mercado_core::repository::ChatMessageRepository;
use mercado_db::repository::SurrealChatMessageRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

async fn setup() -> SurrealChatMessageRepository<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    mercado_db::run_migrations(&db).await.unwrap();
    SurrealChatMessageRepository::new(db)
}

fn message(username: &str, text: &str) -> CreateChatMessage {
    CreateChatMessage {
        username: username.into(),
        text: text.into(),
    }
}

#[tokio::test]
async fn append_assigns_server_side_timestamp() {
    let repo = setup().await;

    let before = chrono::Utc::now();
    let saved = repo.append(message("alice", "hi")).await.unwrap();
    let after = chrono::Utc::now();

    assert_eq!(saved.username, "alice");
    assert_eq!(saved.text, "hi");
    assert!(saved.created_at >= before && saved.created_at <= after);
}

#[tokio::test]
async fn recent_is_ordered_oldest_to_newest() {
    let repo = setup().await;

    for i in 1..=5 {
        repo.append(message("alice", &format!("message {i}")))
            .await
            .unwrap();
    }

    let history = repo.recent(100).await.unwrap();
    assert_eq!(history.len(), 5);
    let texts: Vec<&str> = history.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(
        texts,
        ["message 1", "message 2", "message 3", "message 4", "message 5"]
    );

    // Total order by assignment time.
    for pair in history.windows(2) {
        assert!(pair[0].created_at <= pair[1].created_at);
    }
}

#[tokio::test]
async fn recent_keeps_only_the_newest_messages() {
    let repo = setup().await;

    for i in 1..=7 {
        repo.append(message("bob", &format!("m{i}"))).await.unwrap();
    }

    let history = repo.recent(5).await.unwrap();
    let texts: Vec<&str> = history.iter().map(|m| m.text.as_str()).collect();
    // Oldest two fall off; result still runs oldest to newest.
    assert_eq!(texts, ["m3", "m4", "m5", "m6", "m7"]);
}

#[tokio::test]
async fn recent_on_empty_log_is_empty() {
    let repo = setup().await;
    assert!(repo.recent(100).await.unwrap().is_empty());
}
