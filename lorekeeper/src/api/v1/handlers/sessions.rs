//! v1 Session handlers.

use axum::extract::{Path, State};
use validator::Validate;

use crate::api::v1::dto::sessions::{
    CreateSessionRequest, MessageResponse, SessionDeletedResponse, SessionResponse,
    UpdateSessionRequest,
};
use crate::api::v1::response::{ApiError, ApiResponse, ErrorCode};
use crate::api::AppState;

/// `POST /api/v1/sessions`
#[utoipa::path(
    post,
    path = "/api/v1/sessions",
    tag = "sessions",
    request_body = CreateSessionRequest,
    responses(
        (status = 201, description = "Session created", body = SessionResponse),
    )
)]
pub async fn create_session(
    State(state): State<AppState>,
    axum::Json(req): axum::Json<CreateSessionRequest>,
) -> ApiResponse<SessionResponse> {
    match state.sessions.create_session(req.title).await {
        Ok(session) => {
            tracing::info!(session_id = %session.id, "Session created");
            ApiResponse::created(session.into())
        }
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/sessions`
#[utoipa::path(
    get,
    path = "/api/v1/sessions",
    tag = "sessions",
    responses(
        (status = 200, description = "All sessions, most recently updated first", body = [SessionResponse]),
    )
)]
pub async fn list_sessions(State(state): State<AppState>) -> ApiResponse<Vec<SessionResponse>> {
    match state.sessions.list_sessions().await {
        Ok(sessions) => {
            ApiResponse::success(sessions.into_iter().map(Into::into).collect())
        }
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/sessions/{sessionId}`
#[utoipa::path(
    get,
    path = "/api/v1/sessions/{sessionId}",
    tag = "sessions",
    params(("sessionId" = String, Path, description = "Session id")),
    responses(
        (status = 200, description = "Session details", body = SessionResponse),
        (status = 404, description = "Session not found", body = ApiError),
    )
)]
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResponse<SessionResponse> {
    match state.sessions.get_session(&session_id).await {
        Ok(Some(session)) => ApiResponse::success(session.into()),
        Ok(None) => ApiResponse::error(ErrorCode::NotFound, "Session not found"),
        Err(e) => e.into(),
    }
}

/// `PUT /api/v1/sessions/{sessionId}`
#[utoipa::path(
    put,
    path = "/api/v1/sessions/{sessionId}",
    tag = "sessions",
    params(("sessionId" = String, Path, description = "Session id")),
    request_body = UpdateSessionRequest,
    responses(
        (status = 200, description = "Session updated", body = SessionResponse),
        (status = 404, description = "Session not found", body = ApiError),
    )
)]
pub async fn update_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    axum::Json(req): axum::Json<UpdateSessionRequest>,
) -> ApiResponse<SessionResponse> {
    if let Err(e) = req.validate() {
        return ApiResponse::error(ErrorCode::InvalidRequest, e.to_string());
    }

    match state
        .sessions
        .update_session_title(&session_id, &req.title)
        .await
    {
        Ok(false) => ApiResponse::error(ErrorCode::NotFound, "Session not found"),
        Ok(true) => match state.sessions.get_session(&session_id).await {
            Ok(Some(session)) => ApiResponse::success(session.into()),
            Ok(None) => ApiResponse::error(ErrorCode::NotFound, "Session not found"),
            Err(e) => e.into(),
        },
        Err(e) => e.into(),
    }
}

/// `DELETE /api/v1/sessions/{sessionId}`
///
/// Deletes the session and all of its messages.
#[utoipa::path(
    delete,
    path = "/api/v1/sessions/{sessionId}",
    tag = "sessions",
    params(("sessionId" = String, Path, description = "Session id")),
    responses(
        (status = 200, description = "Session deleted", body = SessionDeletedResponse),
        (status = 404, description = "Session not found", body = ApiError),
    )
)]
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResponse<SessionDeletedResponse> {
    match state.sessions.delete_session(&session_id).await {
        Ok(true) => {
            tracing::info!(session_id = %session_id, "Session deleted");
            ApiResponse::success(SessionDeletedResponse {
                message: "Session deleted".to_string(),
            })
        }
        Ok(false) => ApiResponse::error(ErrorCode::NotFound, "Session not found"),
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/sessions/{sessionId}/messages`
#[utoipa::path(
    get,
    path = "/api/v1/sessions/{sessionId}/messages",
    tag = "sessions",
    params(("sessionId" = String, Path, description = "Session id")),
    responses(
        (status = 200, description = "Messages in chronological order", body = [MessageResponse]),
        (status = 404, description = "Session not found", body = ApiError),
    )
)]
pub async fn list_session_messages(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResponse<Vec<MessageResponse>> {
    match state.sessions.get_session(&session_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return ApiResponse::error(ErrorCode::NotFound, "Session not found"),
        Err(e) => return e.into(),
    }

    match state.sessions.list_messages(&session_id).await {
        Ok(messages) => ApiResponse::success(messages.into_iter().map(Into::into).collect()),
        Err(e) => e.into(),
    }
}
