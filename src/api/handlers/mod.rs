/// API request handlers
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use tracing::error;

use crate::api::session::SessionManager;
use crate::api::types::ErrorResponse;
use crate::api::types::SCHEMA_MISMATCH_CODE;
use crate::errors::GovRagError;
use crate::rag::RagService;

pub mod chat;
pub mod health;

pub use chat::*;
pub use health::*;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub rag: Arc<RagService>,
    pub session_manager: Arc<SessionManager>,
    /// Deployment label reported by the health endpoint
    pub environment: String,
}

/// Structured HTTP error; never carries internal details beyond the message
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>, code: &str) -> Self {
        Self {
            status,
            body: ErrorResponse {
                error: message.into(),
                code: Some(code.to_string()),
            },
        }
    }

    pub fn schema_mismatch(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            message,
            SCHEMA_MISMATCH_CODE,
        )
    }

    /// Only a body that parses badly or has the wrong shape is a schema mismatch;
    /// transport-level rejections keep axum's status
    pub fn from_json_rejection(rejection: &JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => {
                Self::schema_mismatch(rejection.body_text())
            }
            JsonRejection::MissingJsonContentType(_) => Self::new(
                rejection.status(),
                rejection.body_text(),
                "unsupported_media_type",
            ),
            _ if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => Self::new(
                rejection.status(),
                rejection.body_text(),
                "payload_too_large",
            ),
            _ => Self::new(rejection.status(), rejection.body_text(), "invalid_body"),
        }
    }
}

impl From<GovRagError> for ApiError {
    fn from(err: GovRagError) -> Self {
        if err.is_client_error() {
            Self::new(StatusCode::BAD_REQUEST, err.to_string(), "invalid_question")
        } else if err.is_unavailable() {
            Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                err.to_string(),
                "not_initialized",
            )
        } else {
            error!("Unhandled error at the service boundary: {}", err);
            Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                "internal_error",
            )
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
