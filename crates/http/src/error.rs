//! Error handling for the HTTP layer

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// Application error types that map to HTTP responses.
///
/// Validation and not-found errors render as `{"error": "<message>"}`.
/// Persistence errors render the underlying failure as
/// `{"name": "<kind>", "message": "<detail>"}`.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("{name}: {message}")]
    Persistence {
        status: StatusCode,
        name: String,
        message: String,
    },
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// A store failure surfaced with the given status.
    pub fn persistence(
        status: StatusCode,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Persistence {
            status,
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Persistence { status, .. } => *status,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4();
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(
                error_id = %error_id,
                status_code = %status.as_u16(),
                error = %self,
                "request failed"
            );
        } else {
            tracing::warn!(
                error_id = %error_id,
                status_code = %status.as_u16(),
                error = %self,
                "request rejected"
            );
        }

        let body = match self {
            AppError::Validation(message) | AppError::NotFound(message) => {
                json!({ "error": message })
            }
            AppError::Persistence { name, message, .. } => {
                json!({ "name": name, "message": message })
            }
        };

        (status, Json(body)).into_response()
    }
}
