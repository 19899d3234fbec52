use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::db::DatabaseBackend;
use crate::embeddings::EmbeddingProvider;
use crate::error::{LorekeeperError, Result};
use crate::models::ScoredChunk;

/// An opaque nearest-neighbor provider: given a query, returns the top `k`
/// chunks by similarity, best first.
#[async_trait]
pub trait NearestNeighborProvider: Send + Sync {
    async fn query(&self, text: &str, k: u32) -> Result<Vec<ScoredChunk>>;
    fn is_ready(&self) -> bool;
}

/// Production provider: embeds the query locally and runs a cosine search
/// over the chunk table. Not ready until the startup index build has
/// completed (or found existing chunks).
pub struct ChunkIndex {
    db: Arc<dyn DatabaseBackend>,
    embeddings: EmbeddingProvider,
    ready: AtomicBool,
}

impl ChunkIndex {
    pub fn new(db: Arc<dyn DatabaseBackend>, embeddings: EmbeddingProvider) -> Self {
        Self {
            db,
            embeddings,
            ready: AtomicBool::new(false),
        }
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, AtomicOrdering::SeqCst);
    }
}

#[async_trait]
impl NearestNeighborProvider for ChunkIndex {
    async fn query(&self, text: &str, k: u32) -> Result<Vec<ScoredChunk>> {
        let embedding = self.embeddings.embed_query(text).await?;
        self.db.search_similar_chunks(&embedding, k).await
    }

    fn is_ready(&self) -> bool {
        self.ready.load(AtomicOrdering::SeqCst)
    }
}

/// Turns a question into a ranked, threshold-filtered set of passages.
#[derive(Clone)]
pub struct RetrievalEngine {
    provider: Arc<dyn NearestNeighborProvider>,
    similarity_threshold: f32,
}

impl RetrievalEngine {
    pub fn new(provider: Arc<dyn NearestNeighborProvider>, similarity_threshold: f32) -> Self {
        Self {
            provider,
            similarity_threshold,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.provider.is_ready()
    }

    /// Top `max_results` from the provider, re-sorted by score descending,
    /// then filtered to scores at or above the similarity threshold. An
    /// empty result set is a valid answer, not an error.
    pub async fn search(&self, query: &str, max_results: u32) -> Result<Vec<ScoredChunk>> {
        if !self.provider.is_ready() {
            return Err(LorekeeperError::NotReady(
                "Vector index has not been built yet".to_string(),
            ));
        }

        let mut results = self.provider.query(query, max_results).await?;

        // The provider is expected to return similarity-descending order
        // already; sort anyway since confidence scoring reads the first
        // element.
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

        let raw_count = results.len();
        tracing::info!(query = %query, results = raw_count, "Search executed");
        for (i, result) in results.iter().enumerate() {
            let preview: String = result.content.chars().take(100).collect();
            tracing::info!(
                rank = i + 1,
                score = result.score,
                content = %preview,
                "Search result"
            );
        }

        let filtered: Vec<ScoredChunk> = results
            .into_iter()
            .filter(|result| result.score >= self.similarity_threshold)
            .collect();

        tracing::info!(
            threshold = self.similarity_threshold,
            raw = raw_count,
            kept = filtered.len(),
            "Applied similarity threshold"
        );

        Ok(filtered)
    }
}
