//! Signing session entity.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default lifetime of a signing session
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 72;

/// Lifecycle status of a signing session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Created,
    OtpSent,
    OtpVerified,
    Signing,
    Signed,
    Failed,
    Cancelled,
    Expired,
}

impl SessionStatus {
    /// Convert to string representation for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::OtpSent => "otp_sent",
            Self::OtpVerified => "otp_verified",
            Self::Signing => "signing",
            Self::Signed => "signed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
        }
    }

    /// Parse from string representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "created" => Some(Self::Created),
            "otp_sent" => Some(Self::OtpSent),
            "otp_verified" => Some(Self::OtpVerified),
            "signing" => Some(Self::Signing),
            "signed" => Some(Self::Signed),
            "failed" => Some(Self::Failed),
            "cancelled" => Some(Self::Cancelled),
            "expired" => Some(Self::Expired),
            _ => None,
        }
    }

    /// Statuses a maintenance sweep may move to `Expired`
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            Self::Created | Self::OtpSent | Self::OtpVerified | Self::Signing
        )
    }

    pub const ACTIVE: [SessionStatus; 4] = [
        SessionStatus::Created,
        SessionStatus::OtpSent,
        SessionStatus::OtpVerified,
        SessionStatus::Signing,
    ];
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A signer's e-sign transaction that OTPs authorize
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignSession {
    pub id: String,
    pub signer_email: String,
    pub signer_name: String,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub signed_at: Option<DateTime<Utc>>,
}

impl SignSession {
    /// Open a session for a signer, valid for `ttl_hours`
    pub fn new(
        signer_email: impl Into<String>,
        signer_name: impl Into<String>,
        ttl_hours: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            signer_email: signer_email.into(),
            signer_name: signer_name.into(),
            status: SessionStatus::Created,
            created_at: now,
            updated_at: now,
            expires_at: now + Duration::hours(ttl_hours),
            signed_at: None,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Ready for signing: OTP verified and still within its lifetime
    pub fn can_sign(&self, now: DateTime<Utc>) -> bool {
        self.status == SessionStatus::OtpVerified && !self.is_expired(now)
    }

    /// Record that a code went out. Returns whether the status changed.
    pub fn mark_otp_sent(&mut self, now: DateTime<Utc>) -> bool {
        match self.status {
            SessionStatus::Created | SessionStatus::OtpSent => {
                self.status = SessionStatus::OtpSent;
                self.updated_at = now;
                true
            }
            _ => false,
        }
    }

    /// Record a successful verification. Only valid from `Created` or `OtpSent`.
    pub fn mark_otp_verified(&mut self, now: DateTime<Utc>) -> bool {
        match self.status {
            SessionStatus::Created | SessionStatus::OtpSent => {
                self.status = SessionStatus::OtpVerified;
                self.updated_at = now;
                true
            }
            _ => false,
        }
    }

    /// Move an active session to `Expired`. Returns whether the status changed.
    pub fn expire(&mut self, now: DateTime<Utc>) -> bool {
        if !self.status.is_active() {
            return false;
        }
        self.status = SessionStatus::Expired;
        self.updated_at = now;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(now: DateTime<Utc>) -> SignSession {
        SignSession::new("signer@example.com", "Jane Signer", 1, now)
    }

    #[test]
    fn test_status_round_trip_strings() {
        for status in [
            SessionStatus::Created,
            SessionStatus::OtpSent,
            SessionStatus::Signed,
            SessionStatus::Expired,
        ] {
            assert_eq!(SessionStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(SessionStatus::parse("bogus"), None);
    }

    #[test]
    fn test_can_sign_requires_verified_and_unexpired() {
        let now = Utc::now();
        let mut s = session(now);
        assert!(!s.can_sign(now));

        assert!(s.mark_otp_sent(now));
        assert!(s.mark_otp_verified(now));
        assert!(s.can_sign(now));
        assert!(!s.can_sign(now + Duration::hours(2)));
    }

    #[test]
    fn test_verified_only_from_created_or_sent() {
        let now = Utc::now();
        let mut s = session(now);
        s.status = SessionStatus::Cancelled;
        assert!(!s.mark_otp_verified(now));
        assert_eq!(s.status, SessionStatus::Cancelled);
    }

    #[test]
    fn test_expire_only_active_sessions() {
        let now = Utc::now();
        let mut s = session(now);
        assert!(s.expire(now));
        assert_eq!(s.status, SessionStatus::Expired);
        assert!(!s.expire(now));

        let mut signed = session(now);
        signed.status = SessionStatus::Signed;
        assert!(!signed.expire(now));
    }
}
