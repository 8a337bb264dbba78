//! Delivery transport seam for OTP codes

use async_trait::async_trait;

use crate::errors::DeliveryError;

/// Sends a code to its requester
///
/// Implementations report failure and do not retry; retry policy belongs
/// to the caller.
#[async_trait]
pub trait OtpDelivery: Send + Sync {
    /// Dispatch `code` for `session_id` to `identity`
    ///
    /// # Returns
    /// * `Ok(message_id)` - Provider message identifier
    /// * `Err(DeliveryError)` - If the transport rejected or failed the send
    async fn send(
        &self,
        identity: &str,
        code: &str,
        session_id: &str,
    ) -> Result<String, DeliveryError>;
}

/// Plain-text body of the verification email
pub fn compose_otp_body(code: &str, ttl_minutes: i64, session_id: &str) -> String {
    format!(
        "Your verification code is: {code}\n\n\
         This code will expire in {ttl_minutes} minutes.\n\n\
         If you did not request this code, please ignore this email.\n\n\
         Session ID: {session_id}\n"
    )
}
