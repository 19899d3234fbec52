//! Integration tests for the libsql-backed session and message stores.

use std::sync::Arc;
use std::time::Duration;

use lorekeeper::config::DatabaseConfig;
use lorekeeper::db::{Database, DatabaseBackend, LibSqlBackend};
use lorekeeper::models::{Metadata, Role};
use lorekeeper::services::SessionService;

// A unique on-disk SQLite file per test. libsql reopens the database by path on
// every `connect()`, so a file-backed store keeps the schema across those
// transient connections (an in-memory DB would be dropped when the init
// connection closes). Each call gets its own file so tests stay isolated.
fn temp_db_url() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::OnceLock;
    static DIR: OnceLock<tempfile::TempDir> = OnceLock::new();
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let dir = DIR.get_or_init(|| tempfile::tempdir().unwrap());
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    dir.path()
        .join(format!("test-{n}.db"))
        .to_string_lossy()
        .into_owned()
}

async fn memory_backend() -> Arc<dyn DatabaseBackend> {
    let db = Database::new(&DatabaseConfig {
        url: temp_db_url(),
        auth_token: None,
        local_path: None,
    })
    .await
    .unwrap();
    Arc::new(LibSqlBackend::new(db))
}

// Timestamps order message history; keep successive writes distinguishable.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(5)).await;
}

#[tokio::test]
async fn create_and_get_session() {
    let db = memory_backend().await;

    let session = db.create_session("First run").await.unwrap();
    let fetched = db.get_session(&session.id).await.unwrap().unwrap();

    assert_eq!(fetched.id, session.id);
    assert_eq!(fetched.title, "First run");
}

#[tokio::test]
async fn list_sessions_most_recently_updated_first() {
    let db = memory_backend().await;

    let first = db.create_session("first").await.unwrap();
    settle().await;
    let second = db.create_session("second").await.unwrap();
    settle().await;

    // Appending to the older session bumps it to the front
    db.append_message(&first.id, Role::User, "hello", Metadata::new())
        .await
        .unwrap()
        .unwrap();

    let sessions = db.list_sessions().await.unwrap();
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].id, first.id);
    assert_eq!(sessions[1].id, second.id);
}

#[tokio::test]
async fn append_bumps_updated_at() {
    let db = memory_backend().await;

    let session = db.create_session("run").await.unwrap();
    settle().await;
    db.append_message(&session.id, Role::User, "q", Metadata::new())
        .await
        .unwrap()
        .unwrap();

    let fetched = db.get_session(&session.id).await.unwrap().unwrap();
    assert!(fetched.updated_at > session.updated_at);
}

#[tokio::test]
async fn append_to_missing_session_returns_none() {
    let db = memory_backend().await;

    let result = db
        .append_message("ghost", Role::User, "q", Metadata::new())
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn messages_listed_in_chronological_order() {
    let db = memory_backend().await;

    let session = db.create_session("run").await.unwrap();
    for i in 0..4 {
        let role = if i % 2 == 0 {
            Role::User
        } else {
            Role::Assistant
        };
        db.append_message(&session.id, role, &format!("message {i}"), Metadata::new())
            .await
            .unwrap()
            .unwrap();
        settle().await;
    }

    let messages = db.list_messages(&session.id).await.unwrap();
    assert_eq!(messages.len(), 4);
    for (i, message) in messages.iter().enumerate() {
        assert_eq!(message.content, format!("message {i}"));
    }
}

#[tokio::test]
async fn recent_messages_returns_newest_first() {
    let db = memory_backend().await;

    let session = db.create_session("run").await.unwrap();
    for i in 0..5 {
        db.append_message(
            &session.id,
            Role::User,
            &format!("message {i}"),
            Metadata::new(),
        )
        .await
        .unwrap()
        .unwrap();
        settle().await;
    }

    let recent = db.recent_messages(&session.id, 3).await.unwrap();
    assert_eq!(recent.len(), 3);
    assert_eq!(recent[0].content, "message 4");
    assert_eq!(recent[2].content, "message 2");
}

#[tokio::test]
async fn conversation_history_is_oldest_first_and_bounded() {
    let db = memory_backend().await;
    let sessions = SessionService::new(db);

    let session = sessions.create_session(None).await.unwrap();
    for i in 0..6 {
        sessions
            .append_message(
                &session.id,
                Role::User,
                &format!("message {i}"),
                Metadata::new(),
            )
            .await
            .unwrap()
            .unwrap();
        settle().await;
    }

    let history = sessions.conversation_history(&session.id, 4).await.unwrap();
    assert_eq!(history.len(), 4);
    assert_eq!(history[0].content, "message 2");
    assert_eq!(history[3].content, "message 5");
}

#[tokio::test]
async fn message_metadata_round_trips() {
    let db = memory_backend().await;

    let session = db.create_session("run").await.unwrap();
    let mut metadata = Metadata::new();
    metadata.insert("confidence".to_string(), serde_json::json!(0.42));
    metadata.insert(
        "sources".to_string(),
        serde_json::json!([{"section": "## **1. Combat**"}]),
    );

    db.append_message(&session.id, Role::Assistant, "answer", metadata)
        .await
        .unwrap()
        .unwrap();

    let messages = db.list_messages(&session.id).await.unwrap();
    assert_eq!(messages[0].metadata["confidence"], serde_json::json!(0.42));
    assert!(messages[0].metadata["sources"].is_array());
}

#[tokio::test]
async fn update_title_and_missing_session_cases() {
    let db = memory_backend().await;

    let session = db.create_session("before").await.unwrap();
    assert!(db.update_session_title(&session.id, "after").await.unwrap());
    assert_eq!(
        db.get_session(&session.id).await.unwrap().unwrap().title,
        "after"
    );

    assert!(!db.update_session_title("ghost", "title").await.unwrap());
}

#[tokio::test]
async fn delete_session_removes_its_messages() {
    let db = memory_backend().await;

    let session = db.create_session("run").await.unwrap();
    db.append_message(&session.id, Role::User, "q", Metadata::new())
        .await
        .unwrap()
        .unwrap();

    assert!(db.delete_session(&session.id).await.unwrap());
    assert!(db.get_session(&session.id).await.unwrap().is_none());
    assert!(db.list_messages(&session.id).await.unwrap().is_empty());

    // Deleting again reports absence
    assert!(!db.delete_session(&session.id).await.unwrap());
}

#[tokio::test]
async fn default_session_title_is_generated() {
    let db = memory_backend().await;
    let sessions = SessionService::new(db);

    let session = sessions.create_session(None).await.unwrap();
    assert!(session.title.starts_with("New conversation - "));

    let titled = sessions
        .create_session(Some("Custom title".to_string()))
        .await
        .unwrap();
    assert_eq!(titled.title, "Custom title");
}
