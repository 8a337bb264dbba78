//! Business services containing domain logic and use cases.

pub mod audit;
pub mod maintenance;
pub mod otp;

pub use audit::{AuditService, AuditServiceConfig};
pub use maintenance::{MaintenanceReport, MaintenanceService};
pub use otp::{
    compose_otp_body, InMemoryRateLimiter, IssueOutcome, OtpDelivery, OtpService,
    RateLimitDecision, RateLimiter, VerifyOutcome,
};
