//! Audit event repository module.

#[path = "trait.rs"]
mod trait_;
pub use trait_::AuditRepository;

mod noop;
pub use noop::NoOpAuditRepository;

mod mock;
pub use mock::MockAuditRepository;
