//! Chat request/response DTOs for the v1 API.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models;
use crate::models::Metadata;

fn default_max_results() -> u32 {
    3
}

/// Request body for `POST /v1/chat`.
#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// The user's question about the game specification.
    #[validate(length(min = 1, message = "Question cannot be empty"))]
    pub question: String,
    /// Session to continue; a new session is created when omitted.
    pub session_id: Option<String>,
    /// Maximum number of passages to retrieve (1-10).
    #[serde(default = "default_max_results")]
    #[validate(range(min = 1, max = 10, message = "maxResults must be between 1 and 10"))]
    pub max_results: u32,
}

/// A source passage cited by the answer.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SourceDocumentDto {
    /// Passage content, truncated for display.
    pub content: String,
    /// Section header the passage belongs to (may be empty).
    pub section: String,
    /// Additional metadata; carries at least the raw similarity score.
    #[schema(value_type = Object)]
    pub metadata: Metadata,
}

impl From<models::SourceDocument> for SourceDocumentDto {
    fn from(source: models::SourceDocument) -> Self {
        Self {
            content: source.content,
            section: source.section,
            metadata: source.metadata,
        }
    }
}

/// Response for `POST /v1/chat`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    /// The generated answer.
    pub answer: String,
    /// Passages the answer was grounded on.
    pub sources: Vec<SourceDocumentDto>,
    /// Confidence score in `[0.0, 1.0]`; `0.0` when nothing was retrieved.
    pub confidence: f32,
    /// Session the turn was recorded against.
    pub session_id: String,
}

impl From<models::ChatOutcome> for ChatResponse {
    fn from(outcome: models::ChatOutcome) -> Self {
        Self {
            answer: outcome.answer,
            sources: outcome.sources.into_iter().map(Into::into).collect(),
            confidence: outcome.confidence,
            session_id: outcome.session_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_deserializes_minimal() {
        let json = r#"{"question": "How does crafting work?"}"#;
        let req: ChatRequest = serde_json::from_str(json).expect("deserialize");
        assert_eq!(req.question, "How does crafting work?");
        assert_eq!(req.max_results, 3);
        assert!(req.session_id.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn chat_request_rejects_empty_question() {
        let json = r#"{"question": ""}"#;
        let req: ChatRequest = serde_json::from_str(json).expect("deserialize");
        assert!(req.validate().is_err());
    }

    #[test]
    fn chat_request_rejects_out_of_range_max_results() {
        let json = r#"{"question": "q", "maxResults": 11}"#;
        let req: ChatRequest = serde_json::from_str(json).expect("deserialize");
        assert!(req.validate().is_err());

        let json = r#"{"question": "q", "maxResults": 0}"#;
        let req: ChatRequest = serde_json::from_str(json).expect("deserialize");
        assert!(req.validate().is_err());
    }

    #[test]
    fn chat_response_serializes_camel_case() {
        let resp = ChatResponse {
            answer: "Crafting uses recipes.".to_string(),
            sources: Vec::new(),
            confidence: 0.25,
            session_id: "sess-1".to_string(),
        };
        let json = serde_json::to_value(&resp).expect("serialize");
        assert!(json.get("sessionId").is_some());
        assert!(json.get("confidence").is_some());
    }
}
