use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Chunk, Message, Metadata, Role, ScoredChunk, Session};

// ---------------------------------------------------------------------------
// Individual store traits
// ---------------------------------------------------------------------------

/// CRUD operations for conversation sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create_session(&self, title: &str) -> Result<Session>;
    async fn get_session(&self, id: &str) -> Result<Option<Session>>;
    /// All sessions, most recently updated first.
    async fn list_sessions(&self) -> Result<Vec<Session>>;
    /// Returns false when the session does not exist.
    async fn update_session_title(&self, id: &str, title: &str) -> Result<bool>;
    /// Deletes the session and its messages. Returns false when absent.
    async fn delete_session(&self, id: &str) -> Result<bool>;
}

/// Append-only message operations.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Appends a message and bumps the session's `updated_at`. Returns
    /// `None` when the referenced session does not exist.
    async fn append_message(
        &self,
        session_id: &str,
        role: Role,
        content: &str,
        metadata: Metadata,
    ) -> Result<Option<Message>>;
    /// All messages of a session, `created_at` ascending.
    async fn list_messages(&self, session_id: &str) -> Result<Vec<Message>>;
    /// The most recent `limit` messages, `created_at` descending.
    async fn recent_messages(&self, session_id: &str, limit: u32) -> Result<Vec<Message>>;
}

/// CRUD and vector-search operations for document chunks.
#[async_trait]
pub trait ChunkStore: Send + Sync {
    async fn create_chunks_batch(&self, chunks: &[Chunk]) -> Result<()>;
    async fn update_chunk_embeddings_batch(&self, updates: &[(String, Vec<f32>)]) -> Result<()>;
    /// Top `limit` chunks by cosine similarity to `embedding`, best first.
    async fn search_similar_chunks(&self, embedding: &[f32], limit: u32)
        -> Result<Vec<ScoredChunk>>;
    async fn count_chunks(&self) -> Result<u64>;
    /// Delete all chunks from the store.
    async fn delete_all_chunks(&self) -> Result<u64>;
}

/// The full persistence surface consumed by the services.
pub trait DatabaseBackend: SessionStore + MessageStore + ChunkStore {}
