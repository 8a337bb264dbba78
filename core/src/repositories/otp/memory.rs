//! In-memory implementation of OtpRepository for development and testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::OtpRecord;
use crate::errors::DomainError;

use super::OtpRepository;

/// Process-local OTP store
///
/// Records are kept in issue order, so the last matching entry is the newest.
pub struct InMemoryOtpRepository {
    records: Arc<RwLock<Vec<OtpRecord>>>,
    should_fail: AtomicBool,
}

impl InMemoryOtpRepository {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
            should_fail: AtomicBool::new(false),
        }
    }

    /// Make every subsequent call return a store error
    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    /// Snapshot of all records, oldest first
    pub async fn all(&self) -> Vec<OtpRecord> {
        self.records.read().await.clone()
    }

    fn check_available(&self) -> Result<(), DomainError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(DomainError::Internal {
                message: "OTP store unavailable".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for InMemoryOtpRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OtpRepository for InMemoryOtpRepository {
    async fn create(&self, record: &OtpRecord) -> Result<(), DomainError> {
        self.check_available()?;
        let mut records = self.records.write().await;

        if records.iter().any(|r| r.id == record.id) {
            return Err(DomainError::Validation {
                message: format!("OTP record {} already exists", record.id),
            });
        }

        records.push(record.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<OtpRecord>, DomainError> {
        self.check_available()?;
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn find_latest_by_session(
        &self,
        session_id: &str,
    ) -> Result<Option<OtpRecord>, DomainError> {
        self.check_available()?;
        let records = self.records.read().await;
        // Ties on created_at resolve to the later insert
        let latest = records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.session_id == session_id)
            .max_by_key(|(idx, r)| (r.created_at, *idx))
            .map(|(_, r)| r.clone());
        Ok(latest)
    }

    async fn update_if_version(
        &self,
        record: &OtpRecord,
        expected_version: i64,
    ) -> Result<bool, DomainError> {
        self.check_available()?;
        let mut records = self.records.write().await;

        let stored = records
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or_else(|| DomainError::NotFound {
                resource: format!("OTP record {}", record.id),
            })?;

        if stored.version != expected_version {
            return Ok(false);
        }

        *stored = record.clone();
        Ok(true)
    }

    async fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError> {
        self.check_available()?;
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.expires_at >= cutoff);
        Ok(before - records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(session: &str, now: DateTime<Utc>) -> OtpRecord {
        OtpRecord::issue(session, "h".into(), "s".into(), 5, 5, now)
    }

    #[tokio::test]
    async fn test_latest_by_session_prefers_newest() {
        let repo = InMemoryOtpRepository::new();
        let now = Utc::now();
        let first = record("s-1", now);
        let second = record("s-1", now + Duration::seconds(1));
        let other = record("s-2", now + Duration::seconds(2));

        repo.create(&first).await.unwrap();
        repo.create(&second).await.unwrap();
        repo.create(&other).await.unwrap();

        let latest = repo.find_latest_by_session("s-1").await.unwrap().unwrap();
        assert_eq!(latest.id, second.id);
        assert!(repo.find_latest_by_session("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_latest_by_session_same_timestamp_uses_insert_order() {
        let repo = InMemoryOtpRepository::new();
        let now = Utc::now();
        let first = record("s-1", now);
        let second = record("s-1", now);
        repo.create(&first).await.unwrap();
        repo.create(&second).await.unwrap();

        let latest = repo.find_latest_by_session("s-1").await.unwrap().unwrap();
        assert_eq!(latest.id, second.id);
    }

    #[tokio::test]
    async fn test_update_if_version_rejects_stale_writer() {
        let repo = InMemoryOtpRepository::new();
        let original = record("s-1", Utc::now());
        repo.create(&original).await.unwrap();

        let mut a = original.clone();
        a.attempts = 1;
        a.version = 1;
        assert!(repo.update_if_version(&a, 0).await.unwrap());

        // second writer loaded version 0 too
        let mut b = original.clone();
        b.attempts = 1;
        b.version = 1;
        assert!(!repo.update_if_version(&b, 0).await.unwrap());

        let stored = repo.find_by_id(original.id).await.unwrap().unwrap();
        assert_eq!(stored.version, 1);
        assert_eq!(stored.attempts, 1);
    }

    #[tokio::test]
    async fn test_delete_expired_before() {
        let repo = InMemoryOtpRepository::new();
        let now = Utc::now();
        let old = record("s-1", now - Duration::days(3));
        let fresh = record("s-1", now);
        repo.create(&old).await.unwrap();
        repo.create(&fresh).await.unwrap();

        let deleted = repo.delete_expired_before(now - Duration::days(1)).await.unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(repo.all().await.len(), 1);
    }

    #[tokio::test]
    async fn test_should_fail() {
        let repo = InMemoryOtpRepository::new();
        repo.set_should_fail(true);
        let result = repo.find_latest_by_session("s-1").await;
        assert!(matches!(result, Err(DomainError::Internal { .. })));
    }
}
