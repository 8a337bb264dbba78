//! # SmartFileTools e-Sign Core
//!
//! Domain layer for signer verification: OTP records and their verification
//! state machine, per-identity rate limiting, signing sessions, audit events,
//! and the services that orchestrate them. Persistence, caching and delivery
//! are reached through traits implemented in `sft_infra`.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::{
    AuditEvent, AuditEventType, OtpRecord, OtpState, SessionStatus, SignSession,
    DEFAULT_SESSION_TTL_HOURS,
};
pub use errors::{DeliveryError, DomainError, DomainResult, OtpFailure};
pub use repositories::{
    AuditRepository, InMemoryOtpRepository, InMemorySessionRepository, MockAuditRepository,
    NoOpAuditRepository, OtpRepository, SessionRepository,
};
pub use services::{
    compose_otp_body, AuditService, AuditServiceConfig, InMemoryRateLimiter, IssueOutcome,
    MaintenanceReport, MaintenanceService, OtpDelivery, OtpService, RateLimitDecision,
    RateLimiter, VerifyOutcome,
};

#[cfg(test)]
mod tests {
    // Root re-exports resolve to the same items as their module paths
    #[test]
    fn test_root_reexports() {
        let failure: crate::OtpFailure = crate::errors::OtpFailure::NoActiveCode;
        assert_eq!(failure.code(), "no_active_code");

        let decision: crate::RateLimitDecision =
            crate::services::otp::RateLimitDecision::Allowed { remaining: 1 };
        assert!(decision.is_allowed());
    }
}
