//! Audit service for recording OTP and signing session events.
//!
//! Writes never fail the operation being audited: repository errors are
//! logged and dropped.

use serde_json::json;
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

use sft_shared::utils::email::mask_email;

use crate::domain::entities::{AuditEvent, AuditEventType};
use crate::errors::OtpFailure;
use crate::repositories::AuditRepository;

/// Configuration for the audit service
#[derive(Debug, Clone, Default)]
pub struct AuditServiceConfig {
    /// Spawn writes on the runtime instead of awaiting them
    pub async_writes: bool,
}

/// Records audit trail entries for the OTP flow
pub struct AuditService<R>
where
    R: AuditRepository,
{
    repository: Arc<R>,
    config: AuditServiceConfig,
}

impl<R> AuditService<R>
where
    R: AuditRepository + 'static,
{
    /// Create a new audit service
    pub fn new(repository: Arc<R>, config: AuditServiceConfig) -> Self {
        Self { repository, config }
    }

    /// A code was delivered
    pub async fn log_otp_sent(&self, session_id: &str, email: &str, record_id: Uuid, message_id: &str) {
        let event = AuditEvent::new(session_id, AuditEventType::OtpSent).with_payload(json!({
            "recipient": mask_email(email),
            "otp_id": record_id.to_string(),
            "message_id": message_id,
        }));
        self.write(event).await;
    }

    /// A request was turned away by the rate limiter
    pub async fn log_otp_rate_limited(&self, session_id: &str, email: &str, retry_after_seconds: u64) {
        let event =
            AuditEvent::new(session_id, AuditEventType::OtpRateLimited).with_payload(json!({
                "recipient": mask_email(email),
                "retry_after_seconds": retry_after_seconds,
            }));
        self.write(event).await;
    }

    /// The transport failed to send a code
    pub async fn log_otp_delivery_failed(&self, session_id: &str, email: &str, reason: &str) {
        let event =
            AuditEvent::new(session_id, AuditEventType::OtpDeliveryFailed).with_payload(json!({
                "recipient": mask_email(email),
                "reason": reason,
            }));
        self.write(event).await;
    }

    /// A code was accepted
    pub async fn log_otp_verified(&self, session_id: &str, record_id: Uuid) {
        let event = AuditEvent::new(session_id, AuditEventType::OtpVerified).with_payload(json!({
            "otp_id": record_id.to_string(),
        }));
        self.write(event).await;
    }

    /// A submission was rejected
    pub async fn log_otp_failed(&self, session_id: &str, failure: &OtpFailure) {
        let mut payload = json!({
            "reason": failure.code(),
            "message": failure.message(),
        });
        if let Some(remaining) = failure.remaining_attempts() {
            payload["remaining_attempts"] = json!(remaining);
        }
        let event = AuditEvent::new(session_id, AuditEventType::OtpFailed).with_payload(payload);
        self.write(event).await;
    }

    /// The maintenance sweep expired a session
    pub async fn log_session_expired(&self, session_id: &str, previous_status: &str) {
        let event =
            AuditEvent::new(session_id, AuditEventType::SessionExpired).with_payload(json!({
                "reason": "Session expired automatically",
                "previous_status": previous_status,
            }));
        self.write(event).await;
    }

    async fn write(&self, event: AuditEvent) {
        if self.config.async_writes {
            let repository = Arc::clone(&self.repository);
            task::spawn(async move {
                if let Err(e) = repository.create(&event).await {
                    tracing::warn!(
                        error = %e,
                        event_type = event.event_type.as_str(),
                        session_id = %event.session_id,
                        "Failed to write audit event"
                    );
                }
            });
        } else if let Err(e) = self.repository.create(&event).await {
            tracing::warn!(
                error = %e,
                event_type = event.event_type.as_str(),
                session_id = %event.session_id,
                "Failed to write audit event"
            );
        }
    }
}
