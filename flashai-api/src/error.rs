//! Error types for flashai-api
//!
//! `ServiceError` is raised by orchestration and rendered by the HTTP boundary
//! as the standard `{message, errorCode}` envelope.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use flashai_common::api::{ApiResponse, ErrorCode};
use thiserror::Error;

use crate::llm::ModelError;
use crate::store::StoreError;

const STORAGE_FAILURE_MESSAGE: &str = "Failed to access flashcard storage";
const INTERNAL_FAILURE_MESSAGE: &str = "An unexpected error occurred";

/// Orchestration / boundary error
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Client-caused validation failure (400)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Flashcard key already taken (400)
    #[error("Flashcard for word '{0}' already exists")]
    AlreadyExists(String),

    /// Flashcard key absent (404)
    #[error("Flashcard '{0}' not found")]
    NotFound(String),

    /// Provider refused the request (502)
    #[error("AI service rejected the request: {message}")]
    UpstreamRejected { status: u16, message: String },

    /// Provider unreachable after retries (503)
    #[error("AI service unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Provider reply not in the agreed shape (502)
    #[error("AI service returned an invalid response: {0}")]
    SchemaViolation(String),

    /// Provider reply could not be interpreted (502)
    #[error("Could not parse AI response: {0}")]
    ParseError(String),

    /// Persistence failure (500); detail is logged, never returned
    #[error("Storage error: {0}")]
    Storage(String),

    /// Anything unclassified (500)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for orchestration and handlers
pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::InvalidInput(_) | ServiceError::AlreadyExists(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::UpstreamRejected { .. }
            | ServiceError::SchemaViolation(_)
            | ServiceError::ParseError(_) => StatusCode::BAD_GATEWAY,
            ServiceError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::Storage(_) | ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            ServiceError::InvalidInput(_) => ErrorCode::InvalidInput,
            ServiceError::AlreadyExists(_) => ErrorCode::AlreadyExists,
            ServiceError::NotFound(_) => ErrorCode::NotFound,
            ServiceError::UpstreamRejected { .. } => ErrorCode::UpstreamRejected,
            ServiceError::UpstreamUnavailable(_) => ErrorCode::UpstreamUnavailable,
            ServiceError::SchemaViolation(_) => ErrorCode::SchemaViolation,
            ServiceError::ParseError(_) => ErrorCode::ParseError,
            ServiceError::Storage(_) => ErrorCode::StorageError,
            ServiceError::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Message safe to show the client
    pub fn client_message(&self) -> String {
        match self {
            ServiceError::InvalidInput(msg) => msg.clone(),
            ServiceError::UpstreamUnavailable(_) => {
                "AI service is temporarily unavailable. Please try again later.".to_string()
            }
            ServiceError::Storage(_) => STORAGE_FAILURE_MESSAGE.to_string(),
            ServiceError::Internal(_) => INTERNAL_FAILURE_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(word) => ServiceError::NotFound(word),
            StoreError::AlreadyExists(word) => ServiceError::AlreadyExists(word),
            StoreError::Codec(e) => ServiceError::InvalidInput(format!("Malformed import data: {}", e)),
            io @ StoreError::Io { .. } => ServiceError::Storage(io.to_string()),
        }
    }
}

impl From<ModelError> for ServiceError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Rejected { status, message } => ServiceError::UpstreamRejected { status, message },
            unavailable @ ModelError::Unavailable { .. } => {
                ServiceError::UpstreamUnavailable(unavailable.to_string())
            }
            ModelError::SchemaViolation(msg) => ServiceError::SchemaViolation(msg),
        }
    }
}

impl From<JsonRejection> for ServiceError {
    fn from(rejection: JsonRejection) -> Self {
        ServiceError::InvalidInput(rejection.body_text())
    }
}

impl From<QueryRejection> for ServiceError {
    fn from(rejection: QueryRejection) -> Self {
        ServiceError::InvalidInput(rejection.body_text())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_code = self.error_code();

        if status.is_server_error() {
            tracing::error!(
                status = status.as_u16(),
                error_code = error_code.as_str(),
                error = %self,
                "Request failed"
            );
        } else {
            tracing::debug!(
                status = status.as_u16(),
                error_code = error_code.as_str(),
                error = %self,
                "Request rejected"
            );
        }

        let body = Json(ApiResponse::<()>::error(error_code, self.client_message()));
        (status, body).into_response()
    }
}
