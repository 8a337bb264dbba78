//! MySQL implementation of the OtpRepository trait.
//!
//! Records live in `esign_otp`. Updates are guarded by the `version`
//! column so that concurrent verifications of the same record serialize.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::MySqlPool;
use uuid::Uuid;

use sft_core::domain::entities::OtpRecord;
use sft_core::errors::DomainError;
use sft_core::repositories::OtpRepository;

use super::{column, query_error};

const SELECT_COLUMNS: &str = "id, session_id, code_hash, code_salt, attempts, max_attempts, \
     is_verified, verified_at, created_at, expires_at, version";

pub struct MySqlOtpRepository {
    pool: MySqlPool,
}

impl MySqlOtpRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_record(row: &MySqlRow) -> Result<OtpRecord, DomainError> {
        let id: String = column(row, "id")?;
        Ok(OtpRecord {
            id: Uuid::parse_str(&id).map_err(|e| DomainError::Internal {
                message: format!("Invalid OTP UUID: {}", e),
            })?,
            session_id: column(row, "session_id")?,
            code_hash: column(row, "code_hash")?,
            code_salt: column(row, "code_salt")?,
            attempts: column(row, "attempts")?,
            max_attempts: column(row, "max_attempts")?,
            is_verified: column(row, "is_verified")?,
            verified_at: column(row, "verified_at")?,
            created_at: column(row, "created_at")?,
            expires_at: column(row, "expires_at")?,
            version: column(row, "version")?,
        })
    }
}

#[async_trait]
impl OtpRepository for MySqlOtpRepository {
    async fn create(&self, record: &OtpRecord) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO esign_otp (
                id, session_id, code_hash, code_salt, attempts, max_attempts,
                is_verified, verified_at, created_at, expires_at, version
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.id.to_string())
        .bind(&record.session_id)
        .bind(&record.code_hash)
        .bind(&record.code_salt)
        .bind(record.attempts)
        .bind(record.max_attempts)
        .bind(record.is_verified)
        .bind(record.verified_at)
        .bind(record.created_at)
        .bind(record.expires_at)
        .bind(record.version)
        .execute(&self.pool)
        .await
        .map_err(|e| query_error("Failed to create OTP record", e))?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<OtpRecord>, DomainError> {
        let query = format!("SELECT {} FROM esign_otp WHERE id = ?", SELECT_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_error("Failed to find OTP record", e))?;

        row.as_ref().map(Self::row_to_record).transpose()
    }

    async fn find_latest_by_session(&self, session_id: &str) -> Result<Option<OtpRecord>, DomainError> {
        // seq breaks ties between records created in the same microsecond
        let query = format!(
            "SELECT {} FROM esign_otp WHERE session_id = ? ORDER BY created_at DESC, seq DESC LIMIT 1",
            SELECT_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_error("Failed to find latest OTP record", e))?;

        row.as_ref().map(Self::row_to_record).transpose()
    }

    async fn update_if_version(&self, record: &OtpRecord, expected_version: i64) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE esign_otp
            SET attempts = ?, is_verified = ?, verified_at = ?, version = ?
            WHERE id = ? AND version = ?
            "#,
        )
        .bind(record.attempts)
        .bind(record.is_verified)
        .bind(record.verified_at)
        .bind(record.version)
        .bind(record.id.to_string())
        .bind(expected_version)
        .execute(&self.pool)
        .await
        .map_err(|e| query_error("Failed to update OTP record", e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError> {
        let result = sqlx::query("DELETE FROM esign_otp WHERE expires_at < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| query_error("Failed to purge OTP records", e))?;

        Ok(result.rows_affected() as usize)
    }
}
