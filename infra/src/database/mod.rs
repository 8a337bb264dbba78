//! Database module - MySQL implementations using SQLx
//!
//! Connection pool management and repository implementations for OTP
//! records, signing sessions and audit events.

pub mod connection;
pub mod mysql;

pub use connection::{DatabasePool, PoolStatistics};
pub use mysql::{MySqlAuditRepository, MySqlOtpRepository, MySqlSessionRepository};
