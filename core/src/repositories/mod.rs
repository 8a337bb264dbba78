//! Repository interfaces and in-process implementations.

pub mod audit;
pub mod otp;
pub mod session;

pub use audit::{AuditRepository, MockAuditRepository, NoOpAuditRepository};
pub use otp::{InMemoryOtpRepository, OtpRepository};
pub use session::{InMemorySessionRepository, SessionRepository};
