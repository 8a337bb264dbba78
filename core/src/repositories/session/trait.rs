//! Signing session repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::SignSession;
use crate::errors::DomainError;

/// Persistence for signing sessions
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Insert a new session
    async fn create(&self, session: &SignSession) -> Result<(), DomainError>;

    /// Find a session by identifier
    async fn find_by_id(&self, id: &str) -> Result<Option<SignSession>, DomainError>;

    /// Persist status and timestamp changes
    ///
    /// # Returns
    /// * `Err(DomainError::NotFound)` if the session does not exist
    async fn update(&self, session: &SignSession) -> Result<(), DomainError>;

    /// Sessions past `expires_at` that are still in an active status
    ///
    /// # Arguments
    /// * `now` - Reference instant
    /// * `limit` - Maximum number of sessions to return
    async fn find_expired_active(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<SignSession>, DomainError>;
}
