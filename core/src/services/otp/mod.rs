//! OTP verification service module
//!
//! This module provides the complete one-time password workflow:
//! - Code generation and salted hashing
//! - Per-identity rate limiting of code requests
//! - Delivery through a pluggable transport
//! - Verification with attempt tracking and expiry
//! - Optimistic concurrency on record updates

pub mod codes;
mod delivery;
mod rate_limiter;
mod service;
mod types;
pub mod verifier;

#[cfg(test)]
mod tests;

pub use delivery::{compose_otp_body, OtpDelivery};
pub use rate_limiter::{InMemoryRateLimiter, RateLimitDecision, RateLimiter};
pub use service::OtpService;
pub use types::{IssueOutcome, VerifyOutcome};
