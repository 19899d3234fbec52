use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LorekeeperError {
    #[error("Database error: {0}")]
    Database(#[from] libsql::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Not ready: {0}")]
    NotReady(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("LLM unavailable: {0}")]
    LlmUnavailable(String),

    #[error("LLM rate limit exceeded, retry after {retry_after:?} seconds")]
    LlmRateLimit { retry_after: Option<u64> },

    #[error("LLM authentication error: {0}")]
    LlmAuth(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for LorekeeperError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            LorekeeperError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            LorekeeperError::NotReady(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            LorekeeperError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            LorekeeperError::Database(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            LorekeeperError::Embedding(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            LorekeeperError::Http(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
            LorekeeperError::Json(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            LorekeeperError::Io(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            LorekeeperError::Llm(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            LorekeeperError::LlmUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            LorekeeperError::LlmRateLimit { retry_after } => (
                StatusCode::TOO_MANY_REQUESTS,
                format!("LLM rate limit exceeded, retry after {retry_after:?} seconds"),
            ),
            LorekeeperError::LlmAuth(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            LorekeeperError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, LorekeeperError>;
