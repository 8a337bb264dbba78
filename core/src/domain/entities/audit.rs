//! Audit trail entity for signing session events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Event types recorded for a signing session
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    // OTP issue events
    OtpSent,
    OtpRateLimited,
    OtpDeliveryFailed,

    // OTP verification events
    OtpVerified,
    OtpFailed,

    // Session lifecycle
    SessionExpired,
}

impl AuditEventType {
    /// Convert to string representation for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OtpSent => "otp_sent",
            Self::OtpRateLimited => "otp_rate_limited",
            Self::OtpDeliveryFailed => "otp_delivery_failed",
            Self::OtpVerified => "otp_verified",
            Self::OtpFailed => "otp_failed",
            Self::SessionExpired => "session_expired",
        }
    }

    /// Parse from string representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "otp_sent" => Some(Self::OtpSent),
            "otp_rate_limited" => Some(Self::OtpRateLimited),
            "otp_delivery_failed" => Some(Self::OtpDeliveryFailed),
            "otp_verified" => Some(Self::OtpVerified),
            "otp_failed" => Some(Self::OtpFailed),
            "session_expired" => Some(Self::SessionExpired),
            _ => None,
        }
    }
}

/// One audit trail entry
///
/// The payload carries event details such as the masked recipient or the
/// failure reason. It never carries an OTP code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditEvent {
    pub id: Uuid,
    pub session_id: String,
    pub event_type: AuditEventType,
    pub payload: JsonValue,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(session_id: impl Into<String>, event_type: AuditEventType) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id: session_id.into(),
            event_type,
            payload: JsonValue::Object(Default::default()),
            ip_address: None,
            user_agent: None,
            created_at: Utc::now(),
        }
    }

    /// Replace the event payload
    pub fn with_payload(mut self, payload: JsonValue) -> Self {
        self.payload = payload;
        self
    }

    /// Attach request context
    pub fn with_client(mut self, ip_address: Option<String>, user_agent: Option<String>) -> Self {
        self.ip_address = ip_address;
        self.user_agent = user_agent;
        self
    }

    /// Override the timestamp
    pub fn at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}
