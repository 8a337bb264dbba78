//! Mock email service that keeps messages in memory

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};
use uuid::Uuid;

use sft_core::errors::DeliveryError;
use sft_core::services::otp::{compose_otp_body, OtpDelivery};
use sft_shared::config::EmailConfig;
use sft_shared::utils::email::{is_valid_email, mask_email};

/// A message captured by [`MockEmailService`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub message_id: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Clone)]
pub struct MockEmailService {
    outbox: Arc<Mutex<Vec<SentEmail>>>,
    simulate_failure: Arc<AtomicBool>,
    subject: String,
    ttl_minutes: i64,
}

impl MockEmailService {
    pub fn new(config: &EmailConfig, ttl_minutes: i64) -> Self {
        Self {
            outbox: Arc::new(Mutex::new(Vec::new())),
            simulate_failure: Arc::new(AtomicBool::new(false)),
            subject: config.otp_subject.clone(),
            ttl_minutes,
        }
    }

    /// Make subsequent sends fail with a transport error
    pub fn set_simulate_failure(&self, simulate: bool) {
        self.simulate_failure.store(simulate, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<SentEmail> {
        self.outbox.lock().map(|o| o.clone()).unwrap_or_default()
    }

    pub fn sent_count(&self) -> usize {
        self.outbox.lock().map(|o| o.len()).unwrap_or(0)
    }

    pub fn last_to(&self, recipient: &str) -> Option<SentEmail> {
        self.outbox
            .lock()
            .ok()
            .and_then(|o| o.iter().rev().find(|m| m.to == recipient).cloned())
    }
}

#[async_trait]
impl OtpDelivery for MockEmailService {
    async fn send(&self, identity: &str, code: &str, session_id: &str) -> Result<String, DeliveryError> {
        if !is_valid_email(identity) {
            return Err(DeliveryError::InvalidRecipient {
                address: mask_email(identity),
            });
        }

        if self.simulate_failure.load(Ordering::SeqCst) {
            warn!(email = %mask_email(identity), "Mock email service simulating failure");
            return Err(DeliveryError::Transport {
                message: "Simulated email sending failure".to_string(),
            });
        }

        let message_id = format!("mock_{}", Uuid::new_v4());
        let email = SentEmail {
            message_id: message_id.clone(),
            to: identity.to_string(),
            subject: self.subject.clone(),
            body: compose_otp_body(code, self.ttl_minutes, session_id),
        };

        self.outbox
            .lock()
            .map_err(|_| DeliveryError::Transport {
                message: "Mock outbox lock poisoned".to_string(),
            })?
            .push(email);

        info!(
            provider = "mock",
            email = %mask_email(identity),
            message_id = %message_id,
            session_id = session_id,
            "OTP email sent (mock)"
        );

        Ok(message_id)
    }
}
