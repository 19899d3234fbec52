use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A retrieval-sized passage of the source document, tagged with the section
/// hierarchy active at its position. Produced once at index-build time and
/// immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub content: String,
    /// Most recent level-1 header seen at or before this chunk, or empty.
    pub section: String,
    /// Most recent level-2 header within the current section, or empty.
    pub subsection: String,
    /// Identifier of the source document (its file path).
    pub source: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

impl Chunk {
    pub fn new(
        id: String,
        content: String,
        section: String,
        subsection: String,
        source: String,
        position: i32,
    ) -> Self {
        Self {
            id,
            content,
            section,
            subsection,
            source,
            position,
            created_at: Utc::now(),
        }
    }
}

/// A chunk returned from nearest-neighbor search together with its
/// similarity score. Ephemeral, created per query, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk_id: String,
    pub content: String,
    pub section: String,
    pub subsection: String,
    pub source: String,
    /// Cosine similarity, higher is more similar.
    pub score: f32,
}
