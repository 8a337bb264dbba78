//! Periodic maintenance configuration

use serde::{Deserialize, Serialize};

use super::{env_or, ConfigError};

/// Longest retention accepted for expired OTP records (one year)
pub const MAX_OTP_RETENTION_HOURS: i64 = 365 * 24;

/// Settings for the session expiry and OTP purge sweep
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MaintenanceConfig {
    /// Run the sweep on a timer
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Seconds between sweeps
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,

    /// Hours an expired OTP record is kept before it is purged
    #[serde(default = "default_otp_retention_hours")]
    pub otp_retention_hours: i64,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            interval_seconds: default_interval_seconds(),
            otp_retention_hours: default_otp_retention_hours(),
        }
    }
}

impl MaintenanceConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self {
            enabled: env_or("MAINTENANCE_ENABLED", default_enabled()),
            interval_seconds: env_or("MAINTENANCE_INTERVAL_SECONDS", default_interval_seconds()),
            otp_retention_hours: env_or("OTP_RETENTION_HOURS", default_otp_retention_hours()),
        }
    }

    /// Reject settings the sweep cannot operate with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.interval_seconds == 0 {
            return Err(ConfigError::invalid(
                "maintenance.interval_seconds",
                "must be at least 1 when maintenance is enabled",
            ));
        }
        if !(0..=MAX_OTP_RETENTION_HOURS).contains(&self.otp_retention_hours) {
            return Err(ConfigError::invalid(
                "maintenance.otp_retention_hours",
                format!("must be between 0 and {}", MAX_OTP_RETENTION_HOURS),
            ));
        }
        Ok(())
    }
}

fn default_enabled() -> bool {
    true
}

fn default_interval_seconds() -> u64 {
    86_400 // daily
}

fn default_otp_retention_hours() -> i64 {
    24
}
