use serde::{Deserialize, Serialize};

use super::Metadata;

/// A source passage cited in an answer. Content is truncated for display;
/// the metadata carries at least the raw similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDocument {
    pub content: String,
    pub section: String,
    pub metadata: Metadata,
}

/// The structured result of one chat turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatOutcome {
    pub answer: String,
    pub sources: Vec<SourceDocument>,
    /// In `[0.0, 1.0]`; exactly `0.0` when retrieval found nothing.
    pub confidence: f32,
    pub session_id: String,
}
