//! Email delivery configuration

use serde::{Deserialize, Serialize};

use super::env_or;

/// Email transport used to deliver verification codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailProvider {
    /// Real SMTP relay
    Smtp,
    /// Log-only transport for development
    Mock,
}

impl std::str::FromStr for EmailProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "smtp" => Ok(EmailProvider::Smtp),
            "mock" | "console" => Ok(EmailProvider::Mock),
            _ => Err(format!("Invalid email provider: {}", s)),
        }
    }
}

/// SMTP settings for outgoing mail
#[derive(Clone, Deserialize, Serialize)]
pub struct EmailConfig {
    /// Transport selection
    #[serde(default = "default_provider")]
    pub provider: EmailProvider,

    /// SMTP relay host
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,

    /// SMTP relay port
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// Negotiate STARTTLS with the relay
    #[serde(default = "default_use_tls")]
    pub use_tls: bool,

    /// SMTP username (empty for unauthenticated relays)
    #[serde(default)]
    pub username: String,

    /// SMTP password
    #[serde(default)]
    pub password: String,

    /// Sender address
    #[serde(default = "default_from_address")]
    pub from_address: String,

    /// Sender display name
    #[serde(default = "default_from_name")]
    pub from_name: String,

    /// Subject line for verification code mails
    #[serde(default = "default_otp_subject")]
    pub otp_subject: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            use_tls: default_use_tls(),
            username: String::new(),
            password: String::new(),
            from_address: default_from_address(),
            from_name: default_from_name(),
            otp_subject: default_otp_subject(),
        }
    }
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("provider", &self.provider)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("use_tls", &self.use_tls)
            .field("username", &self.username)
            .field("password", &"****")
            .field("from_address", &self.from_address)
            .field("from_name", &self.from_name)
            .field("otp_subject", &self.otp_subject)
            .finish()
    }
}

impl EmailConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self {
            provider: env_or("EMAIL_PROVIDER", default_provider()),
            smtp_host: std::env::var("SMTP_HOST").unwrap_or_else(|_| default_smtp_host()),
            smtp_port: env_or("SMTP_PORT", default_smtp_port()),
            use_tls: env_or("SMTP_USE_TLS", default_use_tls()),
            username: std::env::var("SMTP_USERNAME").unwrap_or_default(),
            password: std::env::var("SMTP_PASSWORD").unwrap_or_default(),
            from_address: std::env::var("DEFAULT_FROM_EMAIL")
                .unwrap_or_else(|_| default_from_address()),
            from_name: std::env::var("EMAIL_FROM_NAME").unwrap_or_else(|_| default_from_name()),
            otp_subject: std::env::var("ESIGN_OTP_SUBJECT")
                .unwrap_or_else(|_| default_otp_subject()),
        }
    }

    /// Whether SMTP authentication should be attempted
    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty()
    }
}

fn default_provider() -> EmailProvider {
    EmailProvider::Mock
}

fn default_smtp_host() -> String {
    String::from("localhost")
}

fn default_smtp_port() -> u16 {
    587
}

fn default_use_tls() -> bool {
    true
}

fn default_from_address() -> String {
    String::from("noreply@smarttoolpdf.com")
}

fn default_from_name() -> String {
    String::from("SmartFileTools")
}

fn default_otp_subject() -> String {
    String::from("Your SmartToolPDF e-Sign Verification Code")
}
