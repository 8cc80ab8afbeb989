use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use collision_core::CollisionError;
use serde::Serialize;

/// Wire-format error envelope: `{error, message, code}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    pub code: u16,
}

#[derive(Debug)]
pub struct ApiError(pub CollisionError);

impl From<CollisionError> for ApiError {
    fn from(err: CollisionError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError(CollisionError::Validation(message.into()))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError(CollisionError::NotFound(message.into()))
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError(CollisionError::Unauthorized(message.into()))
    }

    /// Client-facing error kind and HTTP-equivalent status. Internal kinds
    /// (cache, LLM) never reach this point on their own; they are degraded
    /// or remapped by the layer that observed them.
    pub fn kind_and_status(&self) -> (&'static str, StatusCode) {
        match &self.0 {
            CollisionError::Unauthorized(_) => ("unauthorized", StatusCode::UNAUTHORIZED),
            CollisionError::Validation(_) => ("validation_failed", StatusCode::BAD_REQUEST),
            CollisionError::UsageLimitExceeded { .. } => {
                ("usage_limit_exceeded", StatusCode::PAYMENT_REQUIRED)
            }
            CollisionError::RateLimitExceeded { .. } => {
                ("rate_limit_exceeded", StatusCode::TOO_MANY_REQUESTS)
            }
            CollisionError::PremiumRequired(_) => {
                ("premium_required", StatusCode::PAYMENT_REQUIRED)
            }
            CollisionError::NotFound(_) => ("not_found", StatusCode::NOT_FOUND),
            CollisionError::UsageCheckFailed(_) => {
                ("usage_check_failed", StatusCode::INTERNAL_SERVER_ERROR)
            }
            CollisionError::Database(_) => ("database_error", StatusCode::INTERNAL_SERVER_ERROR),
            CollisionError::GenerationFailed(_) => (
                "collision_generation_failed",
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            CollisionError::Io(_)
            | CollisionError::Serialization(_)
            | CollisionError::Cache(_)
            | CollisionError::Llm(_)
            | CollisionError::Configuration(_) => {
                ("internal_error", StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (kind, status) = self.kind_and_status();
        let body = Json(ErrorBody {
            error: kind.to_string(),
            message: self.0.to_string(),
            code: status.as_u16(),
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
