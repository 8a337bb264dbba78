//! MySQL implementation of the AuditRepository trait.
//!
//! Audit events are append-only rows in `esign_audit_event`.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::mysql::MySqlRow;
use sqlx::types::Json;
use sqlx::MySqlPool;
use uuid::Uuid;

use sft_core::domain::entities::{AuditEvent, AuditEventType};
use sft_core::errors::DomainError;
use sft_core::repositories::AuditRepository;

use super::{column, query_error};

pub struct MySqlAuditRepository {
    pool: MySqlPool,
}

impl MySqlAuditRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_event(row: &MySqlRow) -> Result<AuditEvent, DomainError> {
        let id: String = column(row, "id")?;
        let event_type: String = column(row, "event_type")?;
        let payload: Json<JsonValue> = column(row, "payload")?;

        Ok(AuditEvent {
            id: Uuid::parse_str(&id).map_err(|e| DomainError::Internal {
                message: format!("Invalid audit UUID: {}", e),
            })?,
            session_id: column(row, "session_id")?,
            event_type: AuditEventType::parse(&event_type).ok_or_else(|| DomainError::Internal {
                message: format!("Unknown event type: {}", event_type),
            })?,
            payload: payload.0,
            ip_address: column(row, "ip_address")?,
            user_agent: column(row, "user_agent")?,
            created_at: column(row, "created_at")?,
        })
    }
}

#[async_trait]
impl AuditRepository for MySqlAuditRepository {
    async fn create(&self, event: &AuditEvent) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO esign_audit_event (
                id, session_id, event_type, payload, ip_address, user_agent, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(event.id.to_string())
        .bind(&event.session_id)
        .bind(event.event_type.as_str())
        .bind(Json(&event.payload))
        .bind(&event.ip_address)
        .bind(&event.user_agent)
        .bind(event.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| query_error("Failed to create audit event", e))?;

        Ok(())
    }

    async fn find_by_session(&self, session_id: &str, limit: usize) -> Result<Vec<AuditEvent>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, session_id, event_type, payload, ip_address, user_agent, created_at
            FROM esign_audit_event
            WHERE session_id = ?
            ORDER BY created_at DESC
            LIMIT ?
            "#,
        )
        .bind(session_id)
        .bind(limit as u64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| query_error("Failed to find audit events", e))?;

        rows.iter().map(Self::row_to_event).collect()
    }
}
