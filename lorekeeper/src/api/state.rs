use std::sync::Arc;

use crate::config::Config;
use crate::db::DatabaseBackend;
use crate::llm::{CompletionProvider, LlmProvider};
use crate::services::{ChatService, NearestNeighborProvider, RetrievalEngine, SessionService};

/// Process-wide shared state: every provider and service is constructed once
/// at startup and shared by reference across concurrent chat turns.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Arc<dyn DatabaseBackend>,
    pub llm: LlmProvider,
    pub retrieval: RetrievalEngine,
    pub sessions: SessionService,
    pub chat: ChatService,
}

impl AppState {
    pub fn new(
        config: Config,
        db: Arc<dyn DatabaseBackend>,
        index: Arc<dyn NearestNeighborProvider>,
        llm: LlmProvider,
    ) -> Self {
        let config = Arc::new(config);
        let retrieval = RetrievalEngine::new(index, config.retrieval.similarity_threshold);
        let sessions = SessionService::new(db.clone());
        let completion: Arc<dyn CompletionProvider> = Arc::new(llm.clone());
        let chat = ChatService::new(
            sessions.clone(),
            retrieval.clone(),
            completion,
            config.retrieval.clone(),
        );

        Self {
            config,
            db,
            llm,
            retrieval,
            sessions,
            chat,
        }
    }
}
