//! Audit service module for recording OTP and session events.

mod service;

pub use service::{AuditService, AuditServiceConfig};

#[cfg(test)]
mod tests;
