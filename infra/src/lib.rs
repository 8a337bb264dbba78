//! # Infrastructure Layer
//!
//! Concrete implementations of the `sft_core` traits for the e-sign OTP
//! service.
//!
//! ## Architecture
//!
//! - **Cache**: Redis client and the atomic Redis rate limiter
//! - **Database**: MySQL repositories for OTP records, sessions and audit events
//! - **Email**: SMTP delivery through lettre plus a recording mock
//! - **Telemetry**: tracing subscriber initialisation
//!
//! ## Features
//!
//! - `mysql`: MySQL persistence (default)
//! - `redis-cache`: Redis rate limiting (default)
//! - `smtp`: SMTP email delivery (default)

use sft_core::errors::DomainError;

/// Cache module - Redis client and rate limiting
#[cfg(feature = "redis-cache")]
pub mod cache;

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// Email delivery module
pub mod email;

/// Tracing subscriber setup
pub mod telemetry;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection or query error
    #[cfg(feature = "mysql")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Redis cache error
    #[cfg(feature = "redis-cache")]
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// SMTP transport error
    #[cfg(feature = "smtp")]
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        DomainError::Internal {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infrastructure_error_maps_to_internal() {
        let err: DomainError = InfrastructureError::Config("bad url".to_string()).into();
        match err {
            DomainError::Internal { message } => {
                assert_eq!(message, "Configuration error: bad url");
            }
            other => panic!("Expected Internal, got {:?}", other),
        }
    }
}
