//! Shared configuration and utilities for the SmartFileTools e-sign services
//!
//! This crate provides common functionality used across the server crates:
//! - Configuration types (OTP policy, cache, database, email, logging)
//! - Layered configuration loading from files and environment
//! - Email address validation and masking for logs

pub mod config;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheBackend, CacheConfig, ConfigError, DatabaseConfig, EmailConfig, EmailProvider,
    Environment, LogFormat, LoggingConfig, MaintenanceConfig, OtpConfig,
};
pub use utils::email;
