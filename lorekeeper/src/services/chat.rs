use std::sync::Arc;

use serde_json::json;

use crate::config::RetrievalConfig;
use crate::error::{LorekeeperError, Result};
use crate::llm::{prompts, CompletionProvider};
use crate::models::{ChatOutcome, HistoryEntry, Metadata, Role, ScoredChunk, SourceDocument};
use crate::services::context::ContextAssembler;
use crate::services::retrieval::RetrievalEngine;
use crate::services::sessions::SessionService;

/// Source snippets returned to the client are capped at this many characters.
const SOURCE_PREVIEW_CHARS: usize = 300;

/// Orchestrates one chat turn: resolve the session, fetch history, persist
/// the user turn, retrieve passages, generate the answer, persist the
/// assistant turn.
#[derive(Clone)]
pub struct ChatService {
    sessions: SessionService,
    retrieval: RetrievalEngine,
    completion: Arc<dyn CompletionProvider>,
    config: RetrievalConfig,
}

impl ChatService {
    pub fn new(
        sessions: SessionService,
        retrieval: RetrievalEngine,
        completion: Arc<dyn CompletionProvider>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            sessions,
            retrieval,
            completion,
            config,
        }
    }

    pub async fn chat(
        &self,
        question: &str,
        session_id: Option<&str>,
        max_results: Option<u32>,
    ) -> Result<ChatOutcome> {
        let max_results = max_results.unwrap_or(self.config.max_results);

        let mut session_id = match session_id {
            Some(id) => id.to_string(),
            None => self.sessions.create_session(None).await?.id,
        };

        // History is read before the current question is appended, so the
        // window never contains the turn being answered.
        let mut history = self
            .sessions
            .conversation_history(&session_id, self.config.history_fetch_limit)
            .await?;

        let appended = self
            .sessions
            .append_message(&session_id, Role::User, question, Metadata::new())
            .await?;

        if appended.is_none() {
            // The caller supplied a stale or deleted session id. Recover
            // once: start a fresh session, drop the stale history, retry.
            tracing::warn!(
                session_id = %session_id,
                "Session not found while appending user message; creating a new session"
            );
            let session = self.sessions.create_session(None).await?;
            session_id = session.id;
            history.clear();

            let retried = self
                .sessions
                .append_message(&session_id, Role::User, question, Metadata::new())
                .await?;
            if retried.is_none() {
                return Err(LorekeeperError::Internal(
                    "Failed to persist user message against a freshly created session".to_string(),
                ));
            }
        }

        let results = self.retrieval.search(question, max_results).await?;

        let (answer, sources, confidence) = if results.is_empty() {
            (
                ContextAssembler::format_no_results().to_string(),
                Vec::new(),
                0.0,
            )
        } else {
            let answer = self.generate_answer(question, &results, &history).await?;
            let confidence = (1.0 - results[0].score).clamp(0.0, 1.0);
            let sources: Vec<SourceDocument> = results.iter().map(format_source).collect();
            (answer, sources, confidence)
        };

        let mut metadata = Metadata::new();
        metadata.insert("sources".to_string(), json!(sources));
        metadata.insert("confidence".to_string(), json!(confidence));

        let persisted = self
            .sessions
            .append_message(&session_id, Role::Assistant, &answer, metadata)
            .await?;
        if persisted.is_none() {
            tracing::warn!(
                session_id = %session_id,
                "Session vanished before the assistant turn could be persisted"
            );
        }

        Ok(ChatOutcome {
            answer,
            sources,
            confidence,
            session_id,
        })
    }

    /// Plain or history-aware generation, depending on whether the session
    /// had prior turns. With history present, the context budget shrinks by
    /// the rendered history length so the combined prompt stays within the
    /// configured bound.
    async fn generate_answer(
        &self,
        question: &str,
        results: &[ScoredChunk],
        history: &[HistoryEntry],
    ) -> Result<String> {
        let (system, context) = if history.is_empty() {
            (
                prompts::answer_system_prompt(),
                ContextAssembler::assemble(results, self.config.max_context_length),
            )
        } else {
            let rendered = prompts::render_history(history, self.config.history_render_limit);
            let budget = self
                .config
                .max_context_length
                .saturating_sub(rendered.chars().count());
            (
                prompts::answer_system_prompt_with_history(
                    history,
                    self.config.history_render_limit,
                ),
                ContextAssembler::assemble(results, budget),
            )
        };

        let user_prompt = prompts::answer_prompt(&context, question);
        let answer = self.completion.complete(&system, &user_prompt).await?;

        Ok(answer.trim().to_string())
    }
}

fn format_source(chunk: &ScoredChunk) -> SourceDocument {
    let content = if chunk.content.chars().count() > SOURCE_PREVIEW_CHARS {
        let preview: String = chunk.content.chars().take(SOURCE_PREVIEW_CHARS).collect();
        format!("{preview}...")
    } else {
        chunk.content.clone()
    };

    let mut metadata = Metadata::new();
    metadata.insert("score".to_string(), json!(chunk.score));

    SourceDocument {
        content,
        section: chunk.section.clone(),
        metadata,
    }
}
