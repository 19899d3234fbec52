use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::{Arc, Mutex};

use crate::config::{parse_provider_model, EmbeddingsConfig};
use crate::error::{LorekeeperError, Result};

pub struct EmbeddingProvider {
    model: Arc<Mutex<TextEmbedding>>,
    batch_size: usize,
    dimensions: usize,
}

impl EmbeddingProvider {
    /// Sync constructor for local models only.
    pub fn new(config: &EmbeddingsConfig) -> Result<Self> {
        let (provider, model_name) = parse_provider_model(&config.model);

        if provider != "local" {
            return Err(LorekeeperError::Embedding(format!(
                "Unsupported embedding provider: {provider}. Local embeddings only.",
            )));
        }

        let embedding_model = resolve_embedding_model(model_name);
        let model = Arc::new(Mutex::new(build_model(embedding_model)?));

        Ok(Self {
            model,
            batch_size: config.batch_size,
            dimensions: config.dimensions,
        })
    }

    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = Arc::clone(&self.model);
        let batch_size = self.batch_size;
        tokio::task::spawn_blocking(move || {
            let mut model = model.lock().map_err(|e| {
                LorekeeperError::Embedding(format!("Embedding model lock poisoned: {e}"))
            })?;
            model
                .embed(texts, Some(batch_size))
                .map_err(|e| LorekeeperError::Embedding(e.to_string()))
        })
        .await
        .map_err(|e| LorekeeperError::Embedding(format!("Embedding worker failed: {e}")))?
    }

    async fn embed_single(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed(vec![text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| LorekeeperError::Embedding("No embedding generated".to_string()))
    }

    pub async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        // Local models use query: prefix
        let prefixed = format!("query: {query}");
        self.embed_single(&prefixed).await
    }

    pub async fn embed_passages(&self, passages: Vec<String>) -> Result<Vec<Vec<f32>>> {
        if passages.is_empty() {
            return Ok(Vec::new());
        }

        let mut all_embeddings = Vec::with_capacity(passages.len());
        for batch in passages.chunks(self.batch_size) {
            // Local models use passage: prefix
            let prefixed: Vec<String> = batch.iter().map(|p| format!("passage: {p}")).collect();
            let mut embedded = self.embed(prefixed).await?;
            all_embeddings.append(&mut embedded);
            tokio::task::yield_now().await;
        }

        Ok(all_embeddings)
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}

impl Clone for EmbeddingProvider {
    fn clone(&self) -> Self {
        Self {
            model: Arc::clone(&self.model),
            batch_size: self.batch_size,
            dimensions: self.dimensions,
        }
    }
}

fn resolve_embedding_model(model_name: &str) -> EmbeddingModel {
    match model_name {
        "BAAI/bge-small-en-v1.5" | "bge-small-en-v1.5" => EmbeddingModel::BGESmallENV15,
        "BAAI/bge-base-en-v1.5" | "bge-base-en-v1.5" => EmbeddingModel::BGEBaseENV15,
        "BAAI/bge-large-en-v1.5" | "bge-large-en-v1.5" => EmbeddingModel::BGELargeENV15,
        "all-MiniLM-L6-v2" | "sentence-transformers/all-MiniLM-L6-v2" => {
            EmbeddingModel::AllMiniLML6V2
        }
        "all-MiniLM-L12-v2" | "sentence-transformers/all-MiniLM-L12-v2" => {
            EmbeddingModel::AllMiniLML12V2
        }
        "intfloat/multilingual-e5-large" | "multilingual-e5-large" => {
            EmbeddingModel::MultilingualE5Large
        }
        _ => EmbeddingModel::BGESmallENV15,
    }
}

fn build_model(embedding_model: EmbeddingModel) -> Result<TextEmbedding> {
    TextEmbedding::try_new(InitOptions::new(embedding_model).with_show_download_progress(true))
        .map_err(|e| LorekeeperError::Embedding(e.to_string()))
}
