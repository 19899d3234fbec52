//! v1 Chat handler.

use axum::extract::State;
use validator::Validate;

use crate::api::v1::dto::chat::{ChatRequest, ChatResponse};
use crate::api::v1::response::{ApiError, ApiResponse, ErrorCode};
use crate::api::AppState;

/// `POST /api/v1/chat`
///
/// Answers a question about the game specification: retrieves relevant
/// passages, generates a grounded answer, and records the turn against a
/// conversation session (created on the fly when none is supplied).
#[utoipa::path(
    post,
    path = "/api/v1/chat",
    tag = "chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Answer generated", body = ChatResponse),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 503, description = "Vector index not ready", body = ApiError),
    )
)]
pub async fn chat(
    State(state): State<AppState>,
    axum::Json(req): axum::Json<ChatRequest>,
) -> ApiResponse<ChatResponse> {
    if let Err(e) = req.validate() {
        return ApiResponse::error(ErrorCode::InvalidRequest, e.to_string());
    }

    let preview: String = req.question.chars().take(50).collect();
    tracing::info!(question = %preview, "Chat request received");

    match state
        .chat
        .chat(&req.question, req.session_id.as_deref(), Some(req.max_results))
        .await
    {
        Ok(outcome) => {
            tracing::info!(session_id = %outcome.session_id, "Chat response generated");
            ApiResponse::success(outcome.into())
        }
        Err(e) => e.into(),
    }
}
