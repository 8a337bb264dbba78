//! One-time password record scoped to a signing session.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// State of a record as seen at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpState {
    /// Issued, not yet verified, not expired, attempts left
    Pending,
    /// Successfully verified (terminal)
    Verified,
    /// Past `expires_at` (terminal)
    Expired,
    /// No attempts left (terminal)
    Exhausted,
}

impl OtpState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OtpState::Pending)
    }
}

/// Stored OTP for one verification request
///
/// Only the salted digest of the code is kept; the plaintext exists in
/// memory just long enough to be delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpRecord {
    /// Unique identifier of this record
    pub id: Uuid,

    /// Signing session the code authorizes
    pub session_id: String,

    /// Hex SHA-256 of `code_salt || code`
    pub code_hash: String,

    /// Per-record random salt, hex encoded
    pub code_salt: String,

    /// Number of failed verification attempts so far
    pub attempts: u32,

    /// Ceiling on `attempts`
    pub max_attempts: u32,

    /// Set once on first successful verification
    pub is_verified: bool,

    /// When `is_verified` became true
    pub verified_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,

    /// After this instant the code is invalid
    pub expires_at: DateTime<Utc>,

    /// Optimistic concurrency counter, bumped on every persisted change
    pub version: i64,
}

impl OtpRecord {
    /// Create a fresh pending record issued at `now`
    pub fn issue(
        session_id: impl Into<String>,
        code_hash: String,
        code_salt: String,
        max_attempts: u32,
        ttl_minutes: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id: session_id.into(),
            code_hash,
            code_salt,
            attempts: 0,
            max_attempts,
            is_verified: false,
            verified_at: None,
            created_at: now,
            expires_at: now + Duration::minutes(ttl_minutes),
            version: 0,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }

    pub fn remaining_attempts(&self) -> u32 {
        self.max_attempts.saturating_sub(self.attempts)
    }

    /// Evaluate the state with the same precedence verification uses
    pub fn state_at(&self, now: DateTime<Utc>) -> OtpState {
        if self.is_exhausted() {
            OtpState::Exhausted
        } else if self.is_expired_at(now) {
            OtpState::Expired
        } else if self.is_verified {
            OtpState::Verified
        } else {
            OtpState::Pending
        }
    }
}
