//! Domain-specific error types and error handling.

mod types;

pub use types::{DeliveryError, OtpFailure};

use thiserror::Error;

/// Core domain errors (general purpose)
///
/// These are faults of the request itself or of the infrastructure behind it.
/// Expected verification outcomes are [`OtpFailure`] values, not errors.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Business rule violation: {message}")]
    BusinessRule { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Concurrent update conflict: {message}")]
    Conflict { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    /// Stable code for callers that render errors
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::BusinessRule { .. } => "BUSINESS_RULE_VIOLATION",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Conflict { .. } => "CONFLICT",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_display() {
        let err = DomainError::NotFound {
            resource: "sign session abc".to_string(),
        };
        assert_eq!(err.to_string(), "Resource not found: sign session abc");
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn test_conflict_code() {
        let err = DomainError::Conflict {
            message: "otp record changed".to_string(),
        };
        assert_eq!(err.code(), "CONFLICT");
        assert!(err.to_string().contains("otp record changed"));
    }
}
