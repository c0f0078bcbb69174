use axum::Json;
use axum::extract::rejection::PathRejection;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::ValidationErrors;

use crate::utils::error_codes;

/// Faults raised by the database or agent collaborators.
#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
    #[error("upstream returned {status}: {body}")]
    UpstreamStatus { status: u16, body: String },
    #[error("unsupported operation: {0}")]
    Unsupported(String),
    #[error("missing: {0}")]
    Missing(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("request validation failed")]
    Validation(#[from] ValidationErrors),
    #[error("malformed request body: {0}")]
    MalformedBody(String),
    #[error("invalid path parameter: {0}")]
    InvalidPath(String),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{context}: {source}")]
    Collaborator {
        context: &'static str,
        #[source]
        source: CollaboratorError,
    },
    #[error("collaborator result does not match {schema}: {source}")]
    Contract {
        schema: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("internal server error")]
    Internal,
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidPath(rejection.body_text())
    }
}

impl AppError {
    pub fn collaborator(context: &'static str) -> impl FnOnce(CollaboratorError) -> Self {
        move |source| AppError::Collaborator { context, source }
    }
}

/// Uniform error body shared by every failure path, including the panic
/// catcher and the unknown-route fallback.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub code: i32,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(code: i32, error: &str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            code,
            error: error.to_string(),
            message: message.into(),
            details: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn internal() -> Self {
        Self::new(
            error_codes::INTERNAL_ERROR,
            "Internal server error",
            "An unexpected error occurred. Please try again later.",
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse::new(
                    error_codes::VALIDATION_ERROR,
                    "Validation error",
                    "Request validation failed",
                )
                .with_details(crate::utils::validation_details(errors)),
            ),
            AppError::MalformedBody(reason) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse::new(
                    error_codes::VALIDATION_ERROR,
                    "Validation error",
                    "Request body could not be decoded",
                )
                .with_details(serde_json::json!({ "body": reason })),
            ),
            AppError::InvalidPath(reason) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse::new(
                    error_codes::VALIDATION_ERROR,
                    "Validation error",
                    "Path parameter could not be decoded",
                )
                .with_details(serde_json::json!({ "path": reason })),
            ),
            AppError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::new(error_codes::NOT_FOUND, "Not found", *message),
            ),
            AppError::Collaborator { context, source } => {
                tracing::error!(error = %source, "{}", context);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(error_codes::COLLABORATOR_ERROR, "Internal server error", *context),
                )
            }
            AppError::Contract { schema, source } => {
                tracing::error!(error = %source, schema, "collaborator result violates response schema");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(
                        error_codes::CONTRACT_VIOLATION,
                        "Internal server error",
                        "An unexpected error occurred. Please try again later.",
                    ),
                )
            }
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::internal()),
        };

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use validator::ValidationError;

    #[test]
    fn not_found_maps_to_404() {
        let response = AppError::NotFound("Event not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn validation_maps_to_422() {
        let mut errors = ValidationErrors::new();
        errors.add("title", ValidationError::new("length"));
        let response = AppError::from(errors).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn collaborator_fault_maps_to_500() {
        let error = AppError::collaborator("Failed to fetch events")(
            CollaboratorError::Unsupported("boom".into()),
        );
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn collaborator_display_keeps_context() {
        let error = AppError::collaborator("Failed to create group")(
            CollaboratorError::Unsupported("no table".into()),
        );
        assert_eq!(
            error.to_string(),
            "Failed to create group: unsupported operation: no table"
        );
    }
}
