//! SMTP delivery through lettre's async transport

use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{error, info};

use sft_core::errors::DeliveryError;
use sft_core::services::otp::{compose_otp_body, OtpDelivery};
use sft_shared::config::EmailConfig;
use sft_shared::utils::email::mask_email;

use crate::InfrastructureError;

pub struct SmtpEmailService {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    subject: String,
    ttl_minutes: i64,
}

impl SmtpEmailService {
    /// Build the transport; no connection is opened until the first send
    pub fn new(config: &EmailConfig, ttl_minutes: i64) -> Result<Self, InfrastructureError> {
        let address: Address = config
            .from_address
            .parse()
            .map_err(|e| InfrastructureError::Config(format!("Invalid from address: {}", e)))?;
        let from = Mailbox::new(Some(config.from_name.clone()), address);

        let mut builder = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
        };
        builder = builder.port(config.smtp_port);

        if config.has_credentials() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }

        info!(
            host = %config.smtp_host,
            port = config.smtp_port,
            tls = config.use_tls,
            "SMTP email service configured"
        );

        Ok(Self {
            transport: builder.build(),
            from,
            subject: config.otp_subject.clone(),
            ttl_minutes,
        })
    }

    fn build_message(&self, identity: &str, code: &str, session_id: &str) -> Result<Message, DeliveryError> {
        let to: Mailbox = identity.parse().map_err(|_| DeliveryError::InvalidRecipient {
            address: mask_email(identity),
        })?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(self.subject.clone())
            .message_id(None)
            .header(ContentType::TEXT_PLAIN)
            .body(compose_otp_body(code, self.ttl_minutes, session_id))
            .map_err(|e| DeliveryError::Build {
                message: e.to_string(),
            })
    }
}

#[async_trait]
impl OtpDelivery for SmtpEmailService {
    async fn send(&self, identity: &str, code: &str, session_id: &str) -> Result<String, DeliveryError> {
        let message = self.build_message(identity, code, session_id)?;
        let message_id = message
            .headers()
            .get_raw("Message-ID")
            .map(str::to_string)
            .unwrap_or_default();

        self.transport.send(message).await.map_err(|e| {
            error!(
                email = %mask_email(identity),
                session_id = session_id,
                error = %e,
                "SMTP send failed"
            );
            DeliveryError::Transport {
                message: e.to_string(),
            }
        })?;

        info!(
            provider = "smtp",
            email = %mask_email(identity),
            message_id = %message_id,
            session_id = session_id,
            "OTP email sent"
        );

        Ok(message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> SmtpEmailService {
        SmtpEmailService::new(&EmailConfig::default(), 5).unwrap()
    }

    #[tokio::test]
    async fn test_message_carries_code_and_subject() {
        let message = service()
            .build_message("jane@example.com", "482913", "sess-1")
            .unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("Subject: Your SmartToolPDF e-Sign Verification Code"));
        assert!(raw.contains("To: jane@example.com"));
        assert!(raw.contains("482913"));
        assert!(raw.contains("Session ID: sess-1"));
        assert!(message.headers().get_raw("Message-ID").is_some());
    }

    #[tokio::test]
    async fn test_invalid_recipient_rejected_before_send() {
        let result = service().send("not an email", "123456", "s").await;
        assert!(matches!(result, Err(DeliveryError::InvalidRecipient { .. })));
    }

    #[test]
    fn test_invalid_from_address() {
        let config = EmailConfig {
            from_address: "nope".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            SmtpEmailService::new(&config, 5),
            Err(InfrastructureError::Config(_))
        ));
    }
}
