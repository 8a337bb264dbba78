//! OTP record repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::OtpRecord;
use crate::errors::DomainError;

/// Persistence for OTP records
///
/// Records are append-only from the issuing side; verification mutates them
/// through [`OtpRepository::update_if_version`] so concurrent submissions for
/// the same record cannot lose an update.
#[async_trait]
pub trait OtpRepository: Send + Sync {
    /// Insert a newly issued record
    async fn create(&self, record: &OtpRecord) -> Result<(), DomainError>;

    /// Find a record by its identifier
    async fn find_by_id(&self, id: Uuid) -> Result<Option<OtpRecord>, DomainError>;

    /// Most recently issued record for a session, if any
    async fn find_latest_by_session(
        &self,
        session_id: &str,
    ) -> Result<Option<OtpRecord>, DomainError>;

    /// Compare-and-swap write
    ///
    /// Persists `record` (including its new `version`) only if the stored
    /// version still equals `expected_version`.
    ///
    /// # Returns
    /// * `Ok(true)` if the write was applied
    /// * `Ok(false)` if another writer got there first
    async fn update_if_version(
        &self,
        record: &OtpRecord,
        expected_version: i64,
    ) -> Result<bool, DomainError>;

    /// Delete records that expired before `cutoff`, returning how many went
    async fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError>;
}
