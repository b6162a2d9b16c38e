use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bookshelf_db::StoreError;
use bookshelf_http::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BookError {
    /// Missing, malformed, or disallowed input.
    #[error("{0}")]
    Validation(String),

    #[error("Book not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl BookError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Convert to an HTTP error, reporting store failures with `store_status`.
    pub fn into_app_error(self, store_status: StatusCode) -> AppError {
        match self {
            BookError::Validation(message) => AppError::validation(message),
            BookError::NotFound => AppError::not_found("Book not found"),
            BookError::Store(err) => AppError::persistence(store_status, err.name(), err.to_string()),
        }
    }
}

impl From<BookError> for AppError {
    fn from(err: BookError) -> Self {
        err.into_app_error(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for BookError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
