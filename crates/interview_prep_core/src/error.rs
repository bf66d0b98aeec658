//! crates/interview_prep_core/src/error.rs
//!
//! The error taxonomy every façade entry point reports through.

use uuid::Uuid;

use crate::ports::{AiError, PortError};
use crate::validation::ValidationErrors;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Bad input shape; `details` maps field → messages.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// No identity on the request.
    #[error("Unauthorized")]
    Auth,

    /// Identity present but not the owner of the resource.
    #[error("{entity} {id} is not owned by the caller")]
    Forbidden { entity: &'static str, id: Uuid },

    /// Resource absent or soft-deleted.
    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("{0}")]
    Conflict(String),

    #[error("Too many requests, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error(transparent)]
    Ai(#[from] AiError),

    #[error("Store error: {0}")]
    Store(PortError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        ServiceError::NotFound { entity, id }
    }

    /// A stable, machine-readable code for the envelope.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "VALIDATION_ERROR",
            ServiceError::Auth => "AUTH_ERROR",
            ServiceError::Forbidden { .. } => "FORBIDDEN_ERROR",
            ServiceError::NotFound { .. } => "NOT_FOUND_ERROR",
            ServiceError::Conflict(_) => "CONFLICT_ERROR",
            ServiceError::RateLimited { .. } => "RATE_LIMIT_ERROR",
            ServiceError::Ai(AiError::MissingCredential | AiError::UnsupportedProvider(_)) => {
                "AI_UNAVAILABLE"
            }
            ServiceError::Ai(e) if e.is_rate_limited() => "AI_RATE_LIMITED",
            ServiceError::Ai(AiError::Vendor { .. }) => "AI_VENDOR_ERROR",
            ServiceError::Ai(AiError::Parse(_)) => "AI_PARSE_ERROR",
            ServiceError::Ai(AiError::EmptyInput(_)) => "VALIDATION_ERROR",
            ServiceError::Store(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        ServiceError::Validation(errors)
    }
}

impl From<PortError> for ServiceError {
    fn from(error: PortError) -> Self {
        match error {
            PortError::Conflict(message) => ServiceError::Conflict(message),
            PortError::Unauthorized => ServiceError::Auth,
            other => ServiceError::Store(other),
        }
    }
}
