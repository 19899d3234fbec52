//! Session request/response DTOs for the v1 API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models;
use crate::models::Metadata;

/// Request body for `POST /v1/sessions`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    /// Session title; auto-generated from the current time when omitted.
    pub title: Option<String>,
}

/// Request body for `PUT /v1/sessions/{sessionId}`.
#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSessionRequest {
    /// The new session title.
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: String,
}

/// A conversation session.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: String,
    pub title: String,
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String)]
    pub updated_at: DateTime<Utc>,
}

impl From<models::Session> for SessionResponse {
    fn from(session: models::Session) -> Self {
        Self {
            id: session.id,
            title: session.title,
            created_at: session.created_at,
            updated_at: session.updated_at,
        }
    }
}

/// A stored message within a session.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: String,
    pub session_id: String,
    /// `"user"` or `"assistant"`.
    #[schema(value_type = String)]
    pub role: models::Role,
    pub content: String,
    #[schema(value_type = Object)]
    pub metadata: Metadata,
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
}

impl From<models::Message> for MessageResponse {
    fn from(message: models::Message) -> Self {
        Self {
            id: message.id,
            session_id: message.session_id,
            role: message.role,
            content: message.content,
            metadata: message.metadata,
            created_at: message.created_at,
        }
    }
}

/// Response for `DELETE /v1/sessions/{sessionId}`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionDeletedResponse {
    pub message: String,
}
