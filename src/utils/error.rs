use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Authentication error: {0}")]
    Unauthenticated(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error_type, message) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                ("database_error", "Internal server error".to_string())
            }
            AppError::Unauthenticated(msg) => {
                tracing::debug!("Unauthenticated: {}", msg);
                ("unauthenticated", msg)
            }
            AppError::InvalidArgument(msg) => {
                tracing::debug!("Invalid argument: {}", msg);
                ("invalid_argument", msg)
            }
            AppError::NotFound(msg) => {
                tracing::debug!("Not found: {}", msg);
                ("not_found", msg)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("internal_error", "Internal server error".to_string())
            }
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
