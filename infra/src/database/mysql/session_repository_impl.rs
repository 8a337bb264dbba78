//! MySQL implementation of the SessionRepository trait over `esign_sign_session`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::MySqlPool;

use sft_core::domain::entities::{SessionStatus, SignSession};
use sft_core::errors::DomainError;
use sft_core::repositories::SessionRepository;

use super::{column, query_error};

const SELECT_COLUMNS: &str =
    "id, signer_email, signer_name, status, created_at, updated_at, expires_at, signed_at";

pub struct MySqlSessionRepository {
    pool: MySqlPool,
}

impl MySqlSessionRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_session(row: &MySqlRow) -> Result<SignSession, DomainError> {
        let status: String = column(row, "status")?;
        Ok(SignSession {
            id: column(row, "id")?,
            signer_email: column(row, "signer_email")?,
            signer_name: column(row, "signer_name")?,
            status: SessionStatus::parse(&status).ok_or_else(|| DomainError::Internal {
                message: format!("Unknown session status: {}", status),
            })?,
            created_at: column(row, "created_at")?,
            updated_at: column(row, "updated_at")?,
            expires_at: column(row, "expires_at")?,
            signed_at: column(row, "signed_at")?,
        })
    }
}

#[async_trait]
impl SessionRepository for MySqlSessionRepository {
    async fn create(&self, session: &SignSession) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO esign_sign_session (
                id, signer_email, signer_name, status,
                created_at, updated_at, expires_at, signed_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&session.id)
        .bind(&session.signer_email)
        .bind(&session.signer_name)
        .bind(session.status.as_str())
        .bind(session.created_at)
        .bind(session.updated_at)
        .bind(session.expires_at)
        .bind(session.signed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| query_error("Failed to create sign session", e))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<SignSession>, DomainError> {
        let query = format!("SELECT {} FROM esign_sign_session WHERE id = ?", SELECT_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_error("Failed to find sign session", e))?;

        row.as_ref().map(Self::row_to_session).transpose()
    }

    async fn update(&self, session: &SignSession) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE esign_sign_session
            SET status = ?, updated_at = ?, expires_at = ?, signed_at = ?
            WHERE id = ?
            "#,
        )
        .bind(session.status.as_str())
        .bind(session.updated_at)
        .bind(session.expires_at)
        .bind(session.signed_at)
        .bind(&session.id)
        .execute(&self.pool)
        .await
        .map_err(|e| query_error("Failed to update sign session", e))?;

        if result.rows_affected() == 0 {
            // MySQL reports zero for an unchanged row too
            let exists: Option<String> =
                sqlx::query_scalar("SELECT id FROM esign_sign_session WHERE id = ?")
                    .bind(&session.id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(|e| query_error("Failed to check sign session", e))?;
            if exists.is_none() {
                return Err(DomainError::NotFound {
                    resource: format!("sign session {}", session.id),
                });
            }
        }

        Ok(())
    }

    async fn find_expired_active(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<SignSession>, DomainError> {
        let placeholders = vec!["?"; SessionStatus::ACTIVE.len()].join(", ");
        let query = format!(
            "SELECT {} FROM esign_sign_session WHERE expires_at < ? AND status IN ({}) \
             ORDER BY expires_at LIMIT ?",
            SELECT_COLUMNS, placeholders
        );

        let mut q = sqlx::query(&query).bind(now);
        for status in SessionStatus::ACTIVE {
            q = q.bind(status.as_str());
        }
        let rows = q
            .bind(limit as u64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_error("Failed to find expired sessions", e))?;

        rows.iter().map(Self::row_to_session).collect()
    }
}
