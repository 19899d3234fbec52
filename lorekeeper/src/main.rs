use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use std::sync::Arc;

use lorekeeper::api::{create_router, AppState};
use lorekeeper::config::Config;
use lorekeeper::db::{Database, DatabaseBackend, LibSqlBackend};
use lorekeeper::embeddings::EmbeddingProvider;
use lorekeeper::ingest::DocumentLoader;
use lorekeeper::llm::LlmProvider;
use lorekeeper::services::ChunkIndex;

#[derive(Parser)]
#[command(name = "lorekeeper")]
#[command(about = "RAG service answering questions about a game design document")]
struct Args {
    /// Drop the existing chunk index and rebuild it from the spec file
    #[arg(long)]
    reindex: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lorekeeper=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    if config.llm.is_none() {
        tracing::warn!(
            "LLM_MODEL is not set — answer generation is disabled. Chat requests that retrieve passages will fail until it is configured."
        );
    }

    tracing::info!("Initializing database...");
    let raw_db = Database::new(&config.database).await?;
    let db: Arc<dyn DatabaseBackend> = Arc::new(LibSqlBackend::new(raw_db));

    tracing::info!("Loading embedding model: {}...", config.embeddings.model);
    let embeddings = EmbeddingProvider::new(&config.embeddings)?;

    let index = Arc::new(ChunkIndex::new(db.clone(), embeddings.clone()));
    build_index(&config, &db, &embeddings, args.reindex).await?;
    index.mark_ready();

    if let Some(llm_config) = &config.llm {
        tracing::info!("Initializing LLM provider: {}...", llm_config.model);
    }
    let llm = LlmProvider::new(config.llm.as_ref());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, db, index, llm);
    let app = create_router(state);

    tracing::info!("Lorekeeper starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/api/v1/health", addr);
    tracing::info!("  API docs:     http://{}/api/v1/docs", addr);
    tracing::info!("  OpenAPI spec: http://{}/api/v1/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Chunk and embed the specification document unless an index already
/// exists. `--reindex` drops the existing chunks first.
async fn build_index(
    config: &Config,
    db: &Arc<dyn DatabaseBackend>,
    embeddings: &EmbeddingProvider,
    reindex: bool,
) -> anyhow::Result<()> {
    let existing = db.count_chunks().await?;

    if existing > 0 && !reindex {
        tracing::info!(chunks = existing, "Using existing chunk index");
        return Ok(());
    }

    if existing > 0 {
        let deleted = db.delete_all_chunks().await?;
        tracing::info!(chunks = deleted, "Dropped existing chunk index");
    }

    let loader = DocumentLoader::new(&config.document);
    tracing::info!(path = %loader.file_path(), "Chunking specification document...");
    let chunks = loader.load()?;
    tracing::info!(chunks = chunks.len(), "Embedding document chunks...");

    let passages: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
    let vectors = embeddings.embed_passages(passages).await?;

    db.create_chunks_batch(&chunks).await?;
    let updates: Vec<(String, Vec<f32>)> = chunks
        .iter()
        .map(|c| c.id.clone())
        .zip(vectors)
        .collect();
    db.update_chunk_embeddings_batch(&updates).await?;

    tracing::info!(chunks = chunks.len(), "Chunk index built");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
