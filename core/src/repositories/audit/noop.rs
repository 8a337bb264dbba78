//! No-op implementation of AuditRepository for when audit logging is not needed

use async_trait::async_trait;

use super::AuditRepository;
use crate::domain::entities::AuditEvent;
use crate::errors::DomainError;

/// Discards every event
pub struct NoOpAuditRepository;

impl NoOpAuditRepository {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NoOpAuditRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuditRepository for NoOpAuditRepository {
    async fn create(&self, _event: &AuditEvent) -> Result<(), DomainError> {
        Ok(())
    }

    async fn find_by_session(
        &self,
        _session_id: &str,
        _limit: usize,
    ) -> Result<Vec<AuditEvent>, DomainError> {
        Ok(Vec::new())
    }
}
