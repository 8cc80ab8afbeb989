use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollisionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Weekly limit of {limit} collisions exceeded. Upgrade to Pro for unlimited access.")]
    UsageLimitExceeded { limit: i32 },

    #[error("Rate limit exceeded. Try again in {retry_after} seconds")]
    RateLimitExceeded { retry_after: i64 },

    #[error("Premium subscription required: {0}")]
    PremiumRequired(String),

    #[error("Usage check failed: {0}")]
    UsageCheckFailed(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Collision generation failed: {0}")]
    GenerationFailed(String),
}

pub type Result<T> = std::result::Result<T, CollisionError>;
