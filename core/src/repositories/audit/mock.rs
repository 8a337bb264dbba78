//! Mock implementation of AuditRepository for testing.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::domain::entities::{AuditEvent, AuditEventType};
use crate::errors::DomainError;

use super::AuditRepository;

/// Mock audit repository that keeps events in memory
pub struct MockAuditRepository {
    events: Arc<Mutex<Vec<AuditEvent>>>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockAuditRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    /// Set whether operations should fail
    pub fn set_should_fail(&self, should_fail: bool) {
        *self.should_fail.lock().unwrap() = should_fail;
    }

    /// Get all stored events for testing
    pub fn get_all_events(&self) -> Vec<AuditEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Event types in insertion order
    pub fn event_types(&self) -> Vec<AuditEventType> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.event_type)
            .collect()
    }

    /// Clear all events
    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    fn fail_if_requested(&self) -> Result<(), DomainError> {
        if *self.should_fail.lock().unwrap() {
            return Err(DomainError::Internal {
                message: "Mock repository error".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for MockAuditRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuditRepository for MockAuditRepository {
    async fn create(&self, event: &AuditEvent) -> Result<(), DomainError> {
        self.fail_if_requested()?;
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn find_by_session(
        &self,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<AuditEvent>, DomainError> {
        self.fail_if_requested()?;

        let events = self.events.lock().unwrap();
        let mut result: Vec<AuditEvent> = events
            .iter()
            .filter(|e| e.session_id == session_id)
            .cloned()
            .collect();

        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        result.truncate(limit);
        Ok(result)
    }
}
