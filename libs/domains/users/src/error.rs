use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserError {
    #[error("invalid email format")]
    InvalidEmail,

    #[error("name cannot be empty or longer than 255 characters")]
    InvalidName,

    #[error("user not found")]
    NotFound,

    /// Carries the rejected address for logs; the client only sees the generic message
    #[error("email already exists")]
    DuplicateEmail(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("store did not respond within {}ms", .0.as_millis())]
    Timeout(Duration),
}

pub type UserResult<T> = Result<T, UserError>;

/// Convert UserError to AppError for standardized error responses
impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::InvalidEmail | UserError::InvalidName => AppError::BadRequest(err.to_string()),
            UserError::NotFound => AppError::NotFound(err.to_string()),
            UserError::DuplicateEmail(_) => AppError::Conflict(err.to_string()),
            UserError::Store(detail) => AppError::Database(detail),
            UserError::Timeout(_) => AppError::DatabaseTimeout(err.to_string()),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
