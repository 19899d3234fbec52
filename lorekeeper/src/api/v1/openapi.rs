use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::dto;
use super::handlers;
use super::response;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Lorekeeper API",
        version = "0.1.0",
        description = "Answers questions about a game design specification by retrieving relevant passages and generating grounded answers, with multi-turn conversation sessions.",
    ),
    paths(
        handlers::health::health_check,
        handlers::chat::chat,
        handlers::sessions::create_session,
        handlers::sessions::list_sessions,
        handlers::sessions::get_session,
        handlers::sessions::update_session,
        handlers::sessions::delete_session,
        handlers::sessions::list_session_messages,
    ),
    components(schemas(
        // Response envelope
        response::ErrorCode,
        response::ApiError,
        // Chat
        dto::chat::ChatRequest,
        dto::chat::ChatResponse,
        dto::chat::SourceDocumentDto,
        // Sessions
        dto::sessions::CreateSessionRequest,
        dto::sessions::UpdateSessionRequest,
        dto::sessions::SessionResponse,
        dto::sessions::MessageResponse,
        dto::sessions::SessionDeletedResponse,
        // Health (handler-local types)
        handlers::health::HealthData,
        handlers::health::EmbeddingsStatus,
        handlers::health::LlmStatus,
    )),
    tags(
        (name = "health", description = "Health check"),
        (name = "chat", description = "Question answering over the game specification"),
        (name = "sessions", description = "Conversation session CRUD and message history"),
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}
