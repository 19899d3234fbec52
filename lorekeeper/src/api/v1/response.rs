//! # V1 API Response Envelope & Error Contract
//!
//! Defines the canonical wire format for all v1 API responses. Every endpoint
//! returns an [`ApiResponse<T>`] envelope:
//!
//! ```json
//! {
//!   "data": { ... },       // present on success, absent on error
//!   "error": { "code": "not_found", "message": "..." }  // present on error
//! }
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::LorekeeperError;

/// Machine-readable error code included in every error response.
///
/// Serialized as a snake_case string on the wire (e.g. `"invalid_request"`).
/// Each variant maps to a fixed HTTP status code via [`ErrorCode::status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request was malformed, had invalid parameters, or failed
    /// validation. HTTP 400.
    InvalidRequest,
    /// The requested resource does not exist. HTTP 404.
    NotFound,
    /// A required collaborator (vector index, LLM) is not available yet.
    /// HTTP 503.
    ServiceUnavailable,
    /// An unexpected server-side error occurred. Internal details are never
    /// leaked to the client. HTTP 500.
    InternalError,
}

impl ErrorCode {
    /// Returns the HTTP status code corresponding to this error code.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequest => write!(f, "invalid_request"),
            Self::NotFound => write!(f, "not_found"),
            Self::ServiceUnavailable => write!(f, "service_unavailable"),
            Self::InternalError => write!(f, "internal_error"),
        }
    }
}

/// Structured error payload within the API envelope.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ApiError {
    /// Machine-readable error classification.
    pub code: ErrorCode,
    /// Human-readable description safe to display to end users.
    /// Internal implementation details are never included.
    pub message: String,
}

/// Canonical v1 API response envelope.
///
/// On success, `data` is present and `error` is absent; on error, the
/// reverse. The HTTP status code is derived from the error code (on error)
/// or set by the success constructor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// The response payload. Present on success, absent on error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error details. Present on error, absent on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,

    /// HTTP status to use in the response. Not serialized on the wire.
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// Success response with data (HTTP 200).
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            status: StatusCode::OK,
        }
    }

    /// Resource created response (HTTP 201).
    pub fn created(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            status: StatusCode::CREATED,
        }
    }

    /// Error response. HTTP status is derived from the [`ErrorCode`].
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        let status = code.status();
        Self {
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
            status,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status;
        match serde_json::to_value(&self) {
            Ok(body) => (status, Json(body)).into_response(),
            Err(_) => {
                let fallback = ApiResponse::<()>::error(
                    ErrorCode::InternalError,
                    "An internal error occurred",
                );
                let body = serde_json::json!({
                    "error": {
                        "code": "internal_error",
                        "message": "An internal error occurred"
                    }
                });
                (fallback.status, Json(body)).into_response()
            }
        }
    }
}

impl<T: Serialize> From<LorekeeperError> for ApiResponse<T> {
    /// Convert a [`LorekeeperError`] into a v1 [`ApiResponse`].
    ///
    /// Internal error details are never leaked to the client: for
    /// `internal_error` responses a generic message is returned and the real
    /// cause is logged via `tracing::error!`.
    fn from(err: LorekeeperError) -> Self {
        match err {
            LorekeeperError::NotFound(ref msg) => {
                ApiResponse::error(ErrorCode::NotFound, msg.clone())
            }

            LorekeeperError::Validation(ref msg) => {
                ApiResponse::error(ErrorCode::InvalidRequest, msg.clone())
            }

            LorekeeperError::Json(ref e) => {
                ApiResponse::error(ErrorCode::InvalidRequest, format!("Invalid JSON: {e}"))
            }

            LorekeeperError::NotReady(ref msg) => {
                ApiResponse::error(ErrorCode::ServiceUnavailable, msg.clone())
            }

            LorekeeperError::LlmUnavailable(ref msg) => {
                ApiResponse::error(ErrorCode::ServiceUnavailable, msg.clone())
            }

            LorekeeperError::LlmRateLimit { retry_after } => {
                let msg = match retry_after {
                    Some(secs) => format!("Rate limit exceeded, retry after {secs} seconds"),
                    None => "Rate limit exceeded".to_string(),
                };
                ApiResponse::error(ErrorCode::InvalidRequest, msg)
            }

            ref internal @ (LorekeeperError::Database(_)
            | LorekeeperError::Embedding(_)
            | LorekeeperError::Http(_)
            | LorekeeperError::Io(_)
            | LorekeeperError::Llm(_)
            | LorekeeperError::LlmAuth(_)
            | LorekeeperError::Internal(_)) => {
                tracing::error!(error = %internal, "Internal error while handling request");
                ApiResponse::error(ErrorCode::InternalError, "An internal error occurred")
            }
        }
    }
}
