//! Domain entities representing core business objects.

pub mod audit;
pub mod otp_record;
pub mod sign_session;

// Re-export commonly used types
pub use audit::{AuditEvent, AuditEventType};
pub use otp_record::{OtpRecord, OtpState};
pub use sign_session::{SessionStatus, SignSession, DEFAULT_SESSION_TTL_HOURS};
