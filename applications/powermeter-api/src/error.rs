use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Out of range: {0}")]
    OutOfRange(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Cannot summarize an empty sequence: {0}")]
    EmptyAggregate(String),
    #[error("Not implemented: {0}")]
    NotImplemented(String),
    #[error("DB error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Store error: {0}")]
    Upstream(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Short machine readable name used in error response bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Config(_) => "ConfigError",
            AppError::InvalidArgument(_) => "InvalidArgument",
            AppError::OutOfRange(_) => "OutOfRange",
            AppError::NotFound(_) => "NotFound",
            AppError::EmptyAggregate(_) => "EmptyAggregate",
            AppError::NotImplemented(_) => "NotImplemented",
            AppError::Db(_) | AppError::Json(_) | AppError::Upstream(_) => "UpstreamFailure",
            AppError::Other(_) => "InternalError",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidArgument(_) | AppError::OutOfRange(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) | AppError::EmptyAggregate(_) => StatusCode::NOT_FOUND,
            AppError::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            AppError::Config(_)
            | AppError::Db(_)
            | AppError::Json(_)
            | AppError::Upstream(_)
            | AppError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!(kind = self.kind(), "{:?}", self);
            match self {
                AppError::Db(_) => "Database error".to_string(),
                AppError::Json(_) => "Malformed data in store".to_string(),
                AppError::Upstream(_) => "Store error".to_string(),
                _ => "Internal server error".to_string(),
            }
        } else {
            self.to_string()
        };

        let body = Json(json!({
            "error": self.kind(),
            "message": message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
