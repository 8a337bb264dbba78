//! Email delivery of OTP codes
//!
//! - **SMTP**: lettre async transport with STARTTLS and optional credentials
//! - **Mock**: records messages in memory for development and tests
//!
//! [`EmailDelivery`] picks one of them from [`EmailConfig`].

pub mod mock;
#[cfg(feature = "smtp")]
pub mod smtp;

use async_trait::async_trait;

use sft_core::errors::DeliveryError;
use sft_core::services::otp::OtpDelivery;
use sft_shared::config::{EmailConfig, EmailProvider};

use crate::InfrastructureError;

pub use mock::{MockEmailService, SentEmail};
#[cfg(feature = "smtp")]
pub use smtp::SmtpEmailService;

/// Delivery backend selected by configuration
pub enum EmailDelivery {
    #[cfg(feature = "smtp")]
    Smtp(SmtpEmailService),
    Mock(MockEmailService),
}

impl EmailDelivery {
    /// Build the configured backend
    ///
    /// `ttl_minutes` is quoted in the message body.
    pub fn from_config(config: &EmailConfig, ttl_minutes: i64) -> Result<Self, InfrastructureError> {
        match config.provider {
            #[cfg(feature = "smtp")]
            EmailProvider::Smtp => Ok(Self::Smtp(SmtpEmailService::new(config, ttl_minutes)?)),
            #[cfg(not(feature = "smtp"))]
            EmailProvider::Smtp => Err(InfrastructureError::Config(
                "SMTP delivery requires the `smtp` feature".to_string(),
            )),
            EmailProvider::Mock => Ok(Self::Mock(MockEmailService::new(config, ttl_minutes))),
        }
    }

    pub fn provider_name(&self) -> &'static str {
        match self {
            #[cfg(feature = "smtp")]
            Self::Smtp(_) => "smtp",
            Self::Mock(_) => "mock",
        }
    }
}

#[async_trait]
impl OtpDelivery for EmailDelivery {
    async fn send(&self, identity: &str, code: &str, session_id: &str) -> Result<String, DeliveryError> {
        match self {
            #[cfg(feature = "smtp")]
            Self::Smtp(smtp) => smtp.send(identity, code, session_id).await,
            Self::Mock(mock) => mock.send(identity, code, session_id).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_provider_selected_by_default() {
        let delivery = EmailDelivery::from_config(&EmailConfig::default(), 5).unwrap();
        assert_eq!(delivery.provider_name(), "mock");
    }

    #[cfg(feature = "smtp")]
    #[test]
    fn test_smtp_provider_selected() {
        let config = EmailConfig {
            provider: EmailProvider::Smtp,
            ..Default::default()
        };
        let delivery = EmailDelivery::from_config(&config, 5).unwrap();
        assert_eq!(delivery.provider_name(), "smtp");
    }

    #[tokio::test]
    async fn test_dispatch_to_mock() {
        let delivery = EmailDelivery::from_config(&EmailConfig::default(), 5).unwrap();
        let id = delivery.send("a@example.com", "123456", "s-1").await.unwrap();
        assert!(id.starts_with("mock_"));

        let EmailDelivery::Mock(mock) = &delivery else {
            panic!("Expected mock delivery");
        };
        assert_eq!(mock.sent_count(), 1);
    }
}
