use libsql::{params, Connection};

use crate::error::Result;
use crate::models::{Chunk, ScoredChunk};

pub struct ChunkRepository;

impl ChunkRepository {
    pub async fn create(conn: &Connection, chunk: &Chunk) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO chunks (
                id, content, section, subsection, source, position, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                chunk.id.clone(),
                chunk.content.clone(),
                chunk.section.clone(),
                chunk.subsection.clone(),
                chunk.source.clone(),
                chunk.position,
                chunk.created_at.to_rfc3339(),
            ],
        )
        .await?;

        Ok(())
    }

    pub async fn create_batch(conn: &Connection, chunks: &[Chunk]) -> Result<()> {
        for chunk in chunks {
            Self::create(conn, chunk).await?;
        }
        Ok(())
    }

    pub async fn update_embedding(
        conn: &Connection,
        chunk_id: &str,
        embedding: &[f32],
    ) -> Result<()> {
        let embedding_json = serde_json::to_string(embedding)?;

        conn.execute(
            "UPDATE chunks SET embedding = vector32(?2) WHERE id = ?1",
            params![chunk_id, embedding_json],
        )
        .await?;

        Ok(())
    }

    pub async fn update_embeddings_batch(
        conn: &Connection,
        updates: &[(String, Vec<f32>)],
    ) -> Result<()> {
        for (chunk_id, embedding) in updates {
            Self::update_embedding(conn, chunk_id, embedding).await?;
        }
        Ok(())
    }

    pub async fn search_similar(
        conn: &Connection,
        embedding: &[f32],
        limit: u32,
    ) -> Result<Vec<ScoredChunk>> {
        let embedding_json = serde_json::to_string(embedding)?;

        let mut rows = conn
            .query(
                r#"
                SELECT
                    id,
                    content,
                    section,
                    subsection,
                    source,
                    1 - vector_distance_cos(embedding, vector32(?1)) as score
                FROM chunks
                WHERE embedding IS NOT NULL
                ORDER BY score DESC
                LIMIT ?2
                "#,
                params![embedding_json, limit],
            )
            .await?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(ScoredChunk {
                chunk_id: row.get(0)?,
                content: row.get(1)?,
                section: row.get(2)?,
                subsection: row.get(3)?,
                source: row.get(4)?,
                score: row.get::<f64>(5)? as f32,
            });
        }

        Ok(results)
    }

    pub async fn count(conn: &Connection) -> Result<u64> {
        let mut rows = conn.query("SELECT COUNT(*) FROM chunks", ()).await?;

        let count = match rows.next().await? {
            Some(row) => row.get::<i64>(0)? as u64,
            None => 0,
        };
        Ok(count)
    }

    pub async fn delete_all(conn: &Connection) -> Result<u64> {
        let affected = conn.execute("DELETE FROM chunks", ()).await?;
        Ok(affected)
    }
}
