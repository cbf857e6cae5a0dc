use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use rust_decimal::Decimal;

/// Application-wide Result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Main application error type
///
/// Every error raised inside an atomic unit aborts the whole unit; the
/// transaction is dropped without commit and nothing is persisted.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// A referenced buyer, device, plan or admin does not exist
    #[error("{entity} '{id}' not found")]
    ReferenceNotFound { entity: &'static str, id: String },

    /// Device price or plan terms are missing or out of range
    #[error("Invalid pricing input: {0}")]
    InvalidPricingInput(String),

    /// Payment attempted against a contract with nothing owed
    #[error("No pending schedule entry for contract '{0}'")]
    NoPendingSchedule(String),

    /// Payment was already confirmed
    #[error("Payment '{0}' is already completed")]
    AlreadyCompleted(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Payment amount differs from the installment it settles
    #[error("Payment amount {actual} does not match installment amount due {expected}")]
    AmountMismatch { expected: Decimal, actual: Decimal },

    /// State conflict (device already sold, contract with settled installments)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Validation errors for business rules
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database operation errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();

        HttpResponse::build(status_code).json(serde_json::json!({
            "error": {
                "message": self.to_string(),
                "code": status_code.as_u16(),
                "kind": self.kind(),
            }
        }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ReferenceNotFound { .. } => StatusCode::NOT_FOUND,
            AppError::InvalidPricingInput(_) => StatusCode::BAD_REQUEST,
            AppError::NoPendingSchedule(_) => StatusCode::BAD_REQUEST,
            AppError::AlreadyCompleted(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AmountMismatch { .. } => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Json(_) => StatusCode::BAD_REQUEST,
            AppError::RateLimitExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Helper functions for common error scenarios
impl AppError {
    pub fn reference_not_found(entity: &'static str, id: impl Into<String>) -> Self {
        AppError::ReferenceNotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        AppError::NotFound(resource.into())
    }

    pub fn pricing(msg: impl Into<String>) -> Self {
        AppError::InvalidPricingInput(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    /// Stable machine-readable error kind for API clients
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::ReferenceNotFound { .. } => "reference_not_found",
            AppError::InvalidPricingInput(_) => "invalid_pricing_input",
            AppError::NoPendingSchedule(_) => "no_pending_schedule",
            AppError::AlreadyCompleted(_) => "already_completed",
            AppError::NotFound(_) => "not_found",
            AppError::AmountMismatch { .. } => "amount_mismatch",
            AppError::Conflict(_) => "conflict",
            AppError::Validation(_) => "validation",
            AppError::Database(_) => "database",
            AppError::Configuration(_) => "configuration",
            AppError::Json(_) => "json",
            AppError::RateLimitExceeded(_) => "rate_limit_exceeded",
            AppError::Internal(_) => "internal",
        }
    }
}
