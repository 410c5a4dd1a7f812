// src/errors.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("MongoDB error: {0}")]
    MongoDB(#[from] mongodb::error::Error),

    #[error("BSON serialization error: {0}")]
    Bson(#[from] mongodb::bson::ser::Error),

    #[error("Invalid ObjectId: {0}")]
    InvalidObjectId(String),

    #[error("Pool not found")]
    PoolNotFound,

    #[error("Fixture not found")]
    FixtureNotFound,

    #[error("Document not found")]
    DocumentNotFound,

    #[error("Not a member of this pool")]
    NotAMember,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Betting closed: {0}")]
    BettingClosed(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::MongoDB(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Database error"),
            AppError::Bson(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Database error"),
            AppError::InvalidObjectId(_) => (StatusCode::BAD_REQUEST, "Invalid ID format"),
            AppError::PoolNotFound => (StatusCode::NOT_FOUND, "Pool not found"),
            AppError::FixtureNotFound => (StatusCode::NOT_FOUND, "Fixture not found"),
            AppError::DocumentNotFound => (StatusCode::NOT_FOUND, "Document not found"),
            AppError::NotAMember => (StatusCode::FORBIDDEN, "Not a member of this pool"),
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "Validation failed"),
            AppError::BettingClosed(_) => (StatusCode::CONFLICT, "Betting closed"),
            AppError::ExternalApi(_) => (StatusCode::BAD_GATEWAY, "External API error"),
            AppError::ConfigurationError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Configuration error"),
        };

        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        let body = Json(json!({
            "error": error_message,
            "message": self.to_string(),
            "success": false,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }));

        (status, body).into_response()
    }
}

impl From<mongodb::bson::oid::Error> for AppError {
    fn from(err: mongodb::bson::oid::Error) -> Self {
        AppError::InvalidObjectId(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl From<crate::services::sports_data::SportsDataError> for AppError {
    fn from(err: crate::services::sports_data::SportsDataError) -> Self {
        AppError::ExternalApi(err.to_string())
    }
}

// Helper conversion functions
impl AppError {
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        AppError::ValidationError(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        AppError::ConfigurationError(msg.into())
    }

    pub fn betting_closed(msg: impl Into<String>) -> Self {
        AppError::BettingClosed(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
