//! Expected failure values of the OTP flow and delivery transport errors

use serde::Serialize;
use thiserror::Error;

/// Why an OTP request or verification did not succeed
///
/// Returned as a value so the calling layer can render it directly.
/// The `Display` text is the user-facing message.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OtpFailure {
    #[error("Too many OTP requests. Please try again later.")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Maximum attempts exceeded")]
    AttemptsExhausted,

    #[error("OTP expired")]
    Expired,

    #[error("OTP already used")]
    AlreadyVerified,

    #[error("Invalid OTP. {remaining} attempts remaining")]
    Mismatch { remaining: u32 },

    #[error("Failed to send OTP email")]
    DeliveryFailed { reason: String },

    #[error("OTP must be {expected_length} digits")]
    InvalidFormat { expected_length: usize },

    #[error("No OTP has been issued for this session")]
    NoActiveCode,
}

impl OtpFailure {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::RateLimited { .. } => "rate_limited",
            Self::AttemptsExhausted => "attempts_exhausted",
            Self::Expired => "expired",
            Self::AlreadyVerified => "already_verified",
            Self::Mismatch { .. } => "mismatch",
            Self::DeliveryFailed { .. } => "delivery_failed",
            Self::InvalidFormat { .. } => "invalid_format",
            Self::NoActiveCode => "no_active_code",
        }
    }

    /// Human-readable reason
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Attempts left on the current code, only known after a mismatch
    pub fn remaining_attempts(&self) -> Option<u32> {
        match self {
            Self::Mismatch { remaining } => Some(*remaining),
            _ => None,
        }
    }

    /// Whether the current code can never succeed; a new one must be requested
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::AttemptsExhausted | Self::Expired | Self::AlreadyVerified | Self::NoActiveCode
        )
    }
}

/// Errors raised by an OTP delivery transport
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("Invalid recipient address: {address}")]
    InvalidRecipient { address: String },

    #[error("Failed to build message: {message}")]
    Build { message: String },

    #[error("Transport failure: {message}")]
    Transport { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_messages() {
        assert_eq!(
            OtpFailure::Mismatch { remaining: 4 }.message(),
            "Invalid OTP. 4 attempts remaining"
        );
        assert_eq!(OtpFailure::AttemptsExhausted.message(), "Maximum attempts exceeded");
        assert_eq!(OtpFailure::Expired.message(), "OTP expired");
        assert_eq!(OtpFailure::AlreadyVerified.message(), "OTP already used");
        assert_eq!(
            OtpFailure::RateLimited { retry_after_seconds: 30 }.message(),
            "Too many OTP requests. Please try again later."
        );
    }

    #[test]
    fn test_failure_codes_are_distinct() {
        let failures = [
            OtpFailure::RateLimited { retry_after_seconds: 1 },
            OtpFailure::AttemptsExhausted,
            OtpFailure::Expired,
            OtpFailure::AlreadyVerified,
            OtpFailure::Mismatch { remaining: 1 },
            OtpFailure::DeliveryFailed { reason: "smtp down".to_string() },
            OtpFailure::InvalidFormat { expected_length: 6 },
            OtpFailure::NoActiveCode,
        ];
        let mut codes: Vec<_> = failures.iter().map(|f| f.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), failures.len());
    }

    #[test]
    fn test_terminal_classification() {
        assert!(OtpFailure::Expired.is_terminal());
        assert!(OtpFailure::AttemptsExhausted.is_terminal());
        assert!(!OtpFailure::Mismatch { remaining: 2 }.is_terminal());
        assert!(!OtpFailure::RateLimited { retry_after_seconds: 5 }.is_terminal());
        assert_eq!(OtpFailure::Mismatch { remaining: 2 }.remaining_attempts(), Some(2));
        assert_eq!(OtpFailure::Expired.remaining_attempts(), None);
    }

    #[test]
    fn test_failure_serializes_with_kind_tag() {
        let json = serde_json::to_value(OtpFailure::Mismatch { remaining: 3 }).unwrap();
        assert_eq!(json["kind"], "mismatch");
        assert_eq!(json["remaining"], 3);

        let json = serde_json::to_value(OtpFailure::DeliveryFailed {
            reason: "smtp down".to_string(),
        })
        .unwrap();
        assert_eq!(json["kind"], "delivery_failed");
        assert_eq!(json["reason"], "smtp down");
    }
}
