//! One-time password policy configuration

use serde::{Deserialize, Serialize};

use super::{env_or, ConfigError};

/// Longest code the generator will produce
pub const MAX_OTP_LENGTH: usize = 12;

/// Longest code lifetime accepted (one day)
pub const MAX_TTL_MINUTES: i64 = 24 * 60;

/// Longest rate limit window accepted (one day)
pub const MAX_RATE_LIMIT_WINDOW_SECONDS: u64 = 86_400;

/// OTP generation, verification and rate limiting policy
///
/// Passed explicitly into the OTP service at construction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OtpConfig {
    /// Number of digits in a generated code
    #[serde(default = "default_otp_length")]
    pub otp_length: usize,

    /// Minutes a code stays valid after issue
    #[serde(default = "default_ttl_minutes")]
    pub ttl_minutes: i64,

    /// Failed verification attempts allowed per code
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Code requests allowed per identity per window
    #[serde(default = "default_rate_limit_per_hour")]
    pub rate_limit_per_hour: u32,

    /// Rate limit window length in seconds
    #[serde(default = "default_rate_limit_window_seconds")]
    pub rate_limit_window_seconds: u64,

    /// Reload-and-retry budget when a concurrent verification wins the race
    #[serde(default = "default_verify_conflict_retries")]
    pub verify_conflict_retries: u32,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            otp_length: default_otp_length(),
            ttl_minutes: default_ttl_minutes(),
            max_attempts: default_max_attempts(),
            rate_limit_per_hour: default_rate_limit_per_hour(),
            rate_limit_window_seconds: default_rate_limit_window_seconds(),
            verify_conflict_retries: default_verify_conflict_retries(),
        }
    }
}

impl OtpConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self {
            otp_length: env_or("OTP_LENGTH", default_otp_length()),
            ttl_minutes: env_or("OTP_TTL_MINUTES", default_ttl_minutes()),
            max_attempts: env_or("MAX_ATTEMPTS", default_max_attempts()),
            rate_limit_per_hour: env_or("RATE_LIMIT_PER_HOUR", default_rate_limit_per_hour()),
            rate_limit_window_seconds: env_or(
                "RATE_LIMIT_WINDOW_SECONDS",
                default_rate_limit_window_seconds(),
            ),
            verify_conflict_retries: env_or(
                "OTP_VERIFY_CONFLICT_RETRIES",
                default_verify_conflict_retries(),
            ),
        }
    }

    /// Override the hourly request ceiling
    pub fn with_rate_limit(mut self, per_hour: u32) -> Self {
        self.rate_limit_per_hour = per_hour;
        self
    }

    /// Override the failed attempt ceiling
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Override the code lifetime
    pub fn with_ttl_minutes(mut self, ttl_minutes: i64) -> Self {
        self.ttl_minutes = ttl_minutes;
        self
    }

    /// Reject settings the OTP service cannot operate with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.otp_length == 0 || self.otp_length > MAX_OTP_LENGTH {
            return Err(ConfigError::invalid(
                "otp_length",
                format!("must be between 1 and {}", MAX_OTP_LENGTH),
            ));
        }
        if self.ttl_minutes <= 0 || self.ttl_minutes > MAX_TTL_MINUTES {
            return Err(ConfigError::invalid(
                "ttl_minutes",
                format!("must be between 1 and {}", MAX_TTL_MINUTES),
            ));
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::invalid("max_attempts", "must be at least 1"));
        }
        if self.rate_limit_per_hour == 0 {
            return Err(ConfigError::invalid("rate_limit_per_hour", "must be at least 1"));
        }
        if self.rate_limit_window_seconds == 0
            || self.rate_limit_window_seconds > MAX_RATE_LIMIT_WINDOW_SECONDS
        {
            return Err(ConfigError::invalid(
                "rate_limit_window_seconds",
                format!("must be between 1 and {}", MAX_RATE_LIMIT_WINDOW_SECONDS),
            ));
        }
        Ok(())
    }
}

fn default_otp_length() -> usize {
    6
}

fn default_ttl_minutes() -> i64 {
    5
}

fn default_max_attempts() -> u32 {
    5
}

fn default_rate_limit_per_hour() -> u32 {
    3
}

fn default_rate_limit_window_seconds() -> u64 {
    3600 // 1 hour
}

fn default_verify_conflict_retries() -> u32 {
    3
}
