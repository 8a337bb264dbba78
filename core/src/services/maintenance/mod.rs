//! Periodic maintenance of signing sessions and OTP records

mod service;

pub use service::{MaintenanceReport, MaintenanceService, SESSION_BATCH_SIZE};
