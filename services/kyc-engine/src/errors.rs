use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, KycEngineError>;

#[derive(Error, Debug)]
pub enum KycEngineError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: Uuid },

    #[error("No primary {kind} recorded for party {owner_id}")]
    NoPrimary { kind: &'static str, owner_id: Uuid },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid status transition: {0}")]
    InvalidStatus(String),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<validator::ValidationErrors> for KycEngineError {
    fn from(err: validator::ValidationErrors) -> Self {
        KycEngineError::Validation(err.to_string())
    }
}

impl ResponseError for KycEngineError {
    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();

        HttpResponse::build(status_code).json(json!({
            "error": {
                "code": status_code.as_u16(),
                "message": self.to_string(),
                "type": self.error_type()
            }
        }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            KycEngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            KycEngineError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            KycEngineError::Validation(_) => StatusCode::BAD_REQUEST,
            KycEngineError::NotFound { .. } => StatusCode::NOT_FOUND,
            KycEngineError::NoPrimary { .. } => StatusCode::NOT_FOUND,
            KycEngineError::Conflict(_) => StatusCode::CONFLICT,
            KycEngineError::InvalidStatus(_) => StatusCode::UNPROCESSABLE_ENTITY,
            KycEngineError::Unauthorized => StatusCode::UNAUTHORIZED,
            KycEngineError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            KycEngineError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl KycEngineError {
    fn error_type(&self) -> &str {
        match self {
            KycEngineError::Database(_) => "database_error",
            KycEngineError::Serialization(_) => "serialization_error",
            KycEngineError::Validation(_) => "validation_error",
            KycEngineError::NotFound { .. } => "not_found",
            KycEngineError::NoPrimary { .. } => "not_found",
            KycEngineError::Conflict(_) => "conflict",
            KycEngineError::InvalidStatus(_) => "invalid_status",
            KycEngineError::Unauthorized => "unauthorized",
            KycEngineError::RateLimitExceeded => "rate_limit",
            KycEngineError::Internal(_) => "internal_error",
        }
    }
}
