//! Result types for the OTP service

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::OtpFailure;

/// Result of requesting (or re-sending) a code
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueOutcome {
    /// Code stored and delivered
    Sent {
        record_id: Uuid,
        expires_at: DateTime<Utc>,
        /// Provider message id from the transport
        message_id: String,
        /// Plaintext code, for the caller's delivery bookkeeping only
        code: String,
    },
    /// Rejected by the per-identity limit; nothing was stored
    RateLimited {
        retry_after_seconds: u64,
        message: String,
    },
    /// Record stored but the transport failed
    DeliveryFailed { reason: String },
}

impl IssueOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, IssueOutcome::Sent { .. })
    }

    /// The failure value for non-success outcomes
    pub fn failure(&self) -> Option<OtpFailure> {
        match self {
            IssueOutcome::Sent { .. } => None,
            IssueOutcome::RateLimited {
                retry_after_seconds,
                ..
            } => Some(OtpFailure::RateLimited {
                retry_after_seconds: *retry_after_seconds,
            }),
            IssueOutcome::DeliveryFailed { reason } => Some(OtpFailure::DeliveryFailed {
                reason: reason.clone(),
            }),
        }
    }
}

/// Result of submitting a code
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    Verified { verified_at: DateTime<Utc> },
    Rejected(OtpFailure),
}

impl VerifyOutcome {
    pub fn is_verified(&self) -> bool {
        matches!(self, VerifyOutcome::Verified { .. })
    }

    /// Human-readable reason, `None` on success
    pub fn message(&self) -> Option<String> {
        match self {
            VerifyOutcome::Verified { .. } => None,
            VerifyOutcome::Rejected(failure) => Some(failure.message()),
        }
    }

    /// Remaining attempts, only present after a mismatch
    pub fn remaining_attempts(&self) -> Option<u32> {
        match self {
            VerifyOutcome::Verified { .. } => None,
            VerifyOutcome::Rejected(failure) => failure.remaining_attempts(),
        }
    }
}
