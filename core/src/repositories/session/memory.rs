//! In-memory implementation of SessionRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::SignSession;
use crate::errors::DomainError;

use super::SessionRepository;

/// Process-local session store keyed by session id
pub struct InMemorySessionRepository {
    sessions: Arc<RwLock<HashMap<String, SignSession>>>,
    fail_updates: AtomicBool,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            fail_updates: AtomicBool::new(false),
        }
    }

    /// Make `update` return a store error while reads keep working
    pub fn set_fail_updates(&self, fail_updates: bool) {
        self.fail_updates.store(fail_updates, Ordering::SeqCst);
    }
}

impl Default for InMemorySessionRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn create(&self, session: &SignSession) -> Result<(), DomainError> {
        let mut sessions = self.sessions.write().await;

        if sessions.contains_key(&session.id) {
            return Err(DomainError::Validation {
                message: format!("Sign session {} already exists", session.id),
            });
        }

        sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<SignSession>, DomainError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(id).cloned())
    }

    async fn update(&self, session: &SignSession) -> Result<(), DomainError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(DomainError::Internal {
                message: "Session store unavailable".to_string(),
            });
        }
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&session.id) {
            Some(stored) => {
                *stored = session.clone();
                Ok(())
            }
            None => Err(DomainError::NotFound {
                resource: format!("sign session {}", session.id),
            }),
        }
    }

    async fn find_expired_active(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<SignSession>, DomainError> {
        let sessions = self.sessions.read().await;
        let mut result: Vec<SignSession> = sessions
            .values()
            .filter(|s| s.status.is_active() && s.is_expired(now))
            .cloned()
            .collect();

        result.sort_by(|a, b| a.expires_at.cmp(&b.expires_at));
        result.truncate(limit);
        Ok(result)
    }
}
