use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::db::connection::Database;
use crate::db::repository::{ChunkRepository, MessageRepository, SessionRepository};
use crate::db::traits::{ChunkStore, DatabaseBackend, MessageStore, SessionStore};
use crate::error::Result;
use crate::models::{Chunk, Message, Metadata, Role, ScoredChunk, Session};

pub struct LibSqlBackend {
    db: Database,
}

impl LibSqlBackend {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionStore for LibSqlBackend {
    async fn create_session(&self, title: &str) -> Result<Session> {
        let conn = self.db.connect()?;
        let session = Session::new(Uuid::new_v4().to_string(), title.to_string());
        SessionRepository::create(&conn, &session).await?;
        Ok(session)
    }

    async fn get_session(&self, id: &str) -> Result<Option<Session>> {
        let conn = self.db.connect()?;
        SessionRepository::get_by_id(&conn, id).await
    }

    async fn list_sessions(&self) -> Result<Vec<Session>> {
        let conn = self.db.connect()?;
        SessionRepository::list(&conn).await
    }

    async fn update_session_title(&self, id: &str, title: &str) -> Result<bool> {
        let conn = self.db.connect()?;
        SessionRepository::update_title(&conn, id, title).await
    }

    async fn delete_session(&self, id: &str) -> Result<bool> {
        let conn = self.db.connect()?;
        SessionRepository::delete(&conn, id).await
    }
}

#[async_trait]
impl MessageStore for LibSqlBackend {
    async fn append_message(
        &self,
        session_id: &str,
        role: Role,
        content: &str,
        metadata: Metadata,
    ) -> Result<Option<Message>> {
        let conn = self.db.connect()?;

        if !SessionRepository::exists(&conn, session_id).await? {
            return Ok(None);
        }

        let message = Message {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            role,
            content: content.to_string(),
            metadata,
            created_at: Utc::now(),
        };
        MessageRepository::create(&conn, &message).await?;
        SessionRepository::touch(&conn, session_id).await?;

        Ok(Some(message))
    }

    async fn list_messages(&self, session_id: &str) -> Result<Vec<Message>> {
        let conn = self.db.connect()?;
        MessageRepository::list_by_session(&conn, session_id).await
    }

    async fn recent_messages(&self, session_id: &str, limit: u32) -> Result<Vec<Message>> {
        let conn = self.db.connect()?;
        MessageRepository::recent(&conn, session_id, limit).await
    }
}

#[async_trait]
impl ChunkStore for LibSqlBackend {
    async fn create_chunks_batch(&self, chunks: &[Chunk]) -> Result<()> {
        let conn = self.db.connect()?;
        ChunkRepository::create_batch(&conn, chunks).await
    }

    async fn update_chunk_embeddings_batch(&self, updates: &[(String, Vec<f32>)]) -> Result<()> {
        let conn = self.db.connect()?;
        ChunkRepository::update_embeddings_batch(&conn, updates).await
    }

    async fn search_similar_chunks(
        &self,
        embedding: &[f32],
        limit: u32,
    ) -> Result<Vec<ScoredChunk>> {
        let conn = self.db.connect()?;
        ChunkRepository::search_similar(&conn, embedding, limit).await
    }

    async fn count_chunks(&self) -> Result<u64> {
        let conn = self.db.connect()?;
        ChunkRepository::count(&conn).await
    }

    async fn delete_all_chunks(&self) -> Result<u64> {
        let conn = self.db.connect()?;
        ChunkRepository::delete_all(&conn).await
    }
}

impl DatabaseBackend for LibSqlBackend {}
