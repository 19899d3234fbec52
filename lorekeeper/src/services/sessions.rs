use std::sync::Arc;

use chrono::Utc;

use crate::db::DatabaseBackend;
use crate::error::Result;
use crate::models::{HistoryEntry, Message, Metadata, Role, Session};

/// Session management: CRUD over conversation sessions plus the bounded
/// history window used by answer generation.
#[derive(Clone)]
pub struct SessionService {
    db: Arc<dyn DatabaseBackend>,
}

impl SessionService {
    pub fn new(db: Arc<dyn DatabaseBackend>) -> Self {
        Self { db }
    }

    /// Create a session; the title defaults to a timestamped one.
    pub async fn create_session(&self, title: Option<String>) -> Result<Session> {
        let title = title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(default_session_title);
        self.db.create_session(&title).await
    }

    pub async fn get_session(&self, id: &str) -> Result<Option<Session>> {
        self.db.get_session(id).await
    }

    pub async fn list_sessions(&self) -> Result<Vec<Session>> {
        self.db.list_sessions().await
    }

    pub async fn update_session_title(&self, id: &str, title: &str) -> Result<bool> {
        self.db.update_session_title(id, title).await
    }

    pub async fn delete_session(&self, id: &str) -> Result<bool> {
        self.db.delete_session(id).await
    }

    /// Returns `None` when the session does not exist.
    pub async fn append_message(
        &self,
        session_id: &str,
        role: Role,
        content: &str,
        metadata: Metadata,
    ) -> Result<Option<Message>> {
        self.db
            .append_message(session_id, role, content, metadata)
            .await
    }

    pub async fn list_messages(&self, session_id: &str) -> Result<Vec<Message>> {
        self.db.list_messages(session_id).await
    }

    /// The most recent `limit` messages of a session, reversed into
    /// chronological (oldest-first) order for prompt building.
    pub async fn conversation_history(
        &self,
        session_id: &str,
        limit: u32,
    ) -> Result<Vec<HistoryEntry>> {
        let mut messages = self.db.recent_messages(session_id, limit).await?;
        messages.reverse();

        Ok(messages
            .into_iter()
            .map(|message| HistoryEntry {
                role: message.role,
                content: message.content,
            })
            .collect())
    }
}

fn default_session_title() -> String {
    format!("New conversation - {}", Utc::now().format("%Y/%m/%d %H:%M"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_title_carries_timestamp() {
        let title = default_session_title();
        assert!(title.starts_with("New conversation - "));
        assert!(title.len() > "New conversation - ".len());
    }
}
