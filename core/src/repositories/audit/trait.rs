//! Audit event repository trait.

use async_trait::async_trait;

use crate::domain::entities::AuditEvent;
use crate::errors::DomainError;

/// Repository trait for audit trail persistence
///
/// Writes happen on the OTP request path; callers treat failures as
/// non-fatal and log them.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Append an audit event
    async fn create(&self, event: &AuditEvent) -> Result<(), DomainError>;

    /// Events for a session, newest first
    ///
    /// # Arguments
    /// * `session_id` - Session to search for
    /// * `limit` - Maximum number of records to return
    async fn find_by_session(
        &self,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<AuditEvent>, DomainError>;
}
