//! Configuration module with business-specific sub-modules
//!
//! - `otp` - code generation, verification and rate limit policy
//! - `cache` - Redis connection used for rate limit counters
//! - `database` - MySQL pool for OTP, session and audit tables
//! - `email` - SMTP delivery of verification codes
//! - `environment` - environment detection and logging configuration
//! - `maintenance` - periodic session expiry and OTP purge

pub mod cache;
pub mod database;
pub mod email;
pub mod environment;
pub mod maintenance;
pub mod otp;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use cache::{CacheBackend, CacheConfig};
pub use database::DatabaseConfig;
pub use email::{EmailConfig, EmailProvider};
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use maintenance::{MaintenanceConfig, MAX_OTP_RETENTION_HOURS};
pub use otp::{OtpConfig, MAX_OTP_LENGTH, MAX_RATE_LIMIT_WINDOW_SECONDS, MAX_TTL_MINUTES};

/// Prefix for layered environment overrides, e.g. `SFT__OTP__MAX_ATTEMPTS=3`
pub const ENV_PREFIX: &str = "SFT";

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Source(#[from] config::ConfigError),

    #[error("Invalid configuration for {field}: {reason}")]
    Invalid { field: String, reason: String },
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Read an environment variable, falling back when it is unset or unparsable
pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    #[serde(default)]
    pub environment: Environment,

    /// OTP policy
    #[serde(default)]
    pub otp: OtpConfig,

    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Email delivery configuration
    #[serde(default)]
    pub email: EmailConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Maintenance sweep configuration
    #[serde(default)]
    pub maintenance: MaintenanceConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

impl AppConfig {
    /// Built-in defaults for an environment
    pub fn for_environment(env: Environment) -> Self {
        Self {
            environment: env,
            otp: OtpConfig::default(),
            cache: CacheConfig::default(),
            database: DatabaseConfig::default(),
            email: EmailConfig::default(),
            logging: LoggingConfig::for_environment(env),
            maintenance: MaintenanceConfig::default(),
        }
    }

    /// Load configuration from flat environment variables (`OTP_LENGTH`, `REDIS_URL`, ...)
    pub fn from_env() -> Self {
        let env = Environment::from_env();
        Self {
            environment: env,
            otp: OtpConfig::from_env(),
            cache: CacheConfig::from_env(),
            database: DatabaseConfig::from_env(),
            email: EmailConfig::from_env(),
            logging: LoggingConfig::for_environment(env),
            maintenance: MaintenanceConfig::from_env(),
        }
    }

    /// Load layered configuration
    ///
    /// Sources, lowest precedence first: built-in defaults for the detected
    /// environment, `config/{environment}.toml` if present, then `SFT__*`
    /// environment variables. A `.env` file is read first when present.
    /// The result is validated before it is returned.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let env = Environment::from_env();
        let defaults = Self::for_environment(env);

        let loaded: AppConfig = config::Config::builder()
            .add_source(config::Config::try_from(&defaults)?)
            .add_source(config::File::with_name(&env.config_file()).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        loaded.validate()?;
        Ok(loaded)
    }

    /// Validate every section that has constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.otp.validate()?;
        self.maintenance.validate()?;
        Ok(())
    }
}
