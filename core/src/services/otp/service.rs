//! OTP orchestration: request, resend and verify

use chrono::Utc;
use std::sync::Arc;

use sft_shared::config::OtpConfig;
use sft_shared::utils::email::{is_valid_email, mask_email, normalize_email};

use crate::domain::entities::{OtpRecord, OtpState, SignSession};
use crate::errors::{DomainError, DomainResult, OtpFailure};
use crate::repositories::{AuditRepository, NoOpAuditRepository, OtpRepository, SessionRepository};
use crate::services::audit::AuditService;

use super::codes;
use super::delivery::OtpDelivery;
use super::rate_limiter::{RateLimitDecision, RateLimiter};
use super::types::{IssueOutcome, VerifyOutcome};
use super::verifier;

/// Issues and verifies one-time codes for signing sessions
pub struct OtpService<R, S, L, D, A = NoOpAuditRepository>
where
    R: OtpRepository,
    S: SessionRepository,
    L: RateLimiter,
    D: OtpDelivery,
    A: AuditRepository + 'static,
{
    /// Durable OTP records
    otp_repository: Arc<R>,
    /// Signing sessions whose status follows the OTP flow
    session_repository: Arc<S>,
    /// Per-identity request ceiling
    rate_limiter: Arc<L>,
    /// Code transport
    delivery: Arc<D>,
    /// Audit trail
    audit: Arc<AuditService<A>>,
    /// Policy
    config: OtpConfig,
}

impl<R, S, L, D, A> OtpService<R, S, L, D, A>
where
    R: OtpRepository,
    S: SessionRepository,
    L: RateLimiter,
    D: OtpDelivery,
    A: AuditRepository + 'static,
{
    /// Create a new OTP service
    ///
    /// # Arguments
    ///
    /// * `otp_repository` - Store for OTP records
    /// * `session_repository` - Store for signing sessions
    /// * `rate_limiter` - Atomic per-identity request counter
    /// * `delivery` - Transport that sends codes
    /// * `audit` - Audit trail writer
    /// * `config` - OTP policy, validated here
    pub fn new(
        otp_repository: Arc<R>,
        session_repository: Arc<S>,
        rate_limiter: Arc<L>,
        delivery: Arc<D>,
        audit: Arc<AuditService<A>>,
        config: OtpConfig,
    ) -> DomainResult<Self> {
        config.validate().map_err(|e| DomainError::Validation {
            message: e.to_string(),
        })?;

        Ok(Self {
            otp_repository,
            session_repository,
            rate_limiter,
            delivery,
            audit,
            config,
        })
    }

    pub fn config(&self) -> &OtpConfig {
        &self.config
    }

    /// Issue a code for `session_id` and send it to `identity`
    ///
    /// This method:
    /// 1. Validates the email address
    /// 2. Counts the request against the identity's rate limit
    /// 3. Generates a code and stores only its salted hash
    /// 4. Sends the code
    /// 5. Moves the session to `OtpSent` and audits the outcome
    ///
    /// Rate limiting and delivery failure are returned as outcomes. OTP store
    /// failures are errors; a session store failure after delivery is logged.
    pub async fn request_otp(&self, identity: &str, session_id: &str) -> DomainResult<IssueOutcome> {
        self.issue(identity, session_id, "otp_requested").await
    }

    /// Issue a fresh code for a session that already has one
    ///
    /// The earlier record stays in place but is superseded: verification
    /// always looks at the newest record. Counts against the same limit.
    pub async fn resend_otp(&self, identity: &str, session_id: &str) -> DomainResult<IssueOutcome> {
        self.issue(identity, session_id, "otp_resend_requested").await
    }

    /// Check a submitted code against the newest record of the session
    ///
    /// A malformed submission is rejected before the record is read, so it
    /// never consumes an attempt. Concurrent submissions are serialized with
    /// a compare-and-swap on the record version; on conflict the record is
    /// reloaded and re-evaluated.
    pub async fn verify_otp(&self, session_id: &str, submitted_code: &str) -> DomainResult<VerifyOutcome> {
        let submitted = submitted_code.trim();

        if !codes::is_well_formed(submitted, self.config.otp_length) {
            tracing::warn!(
                session_id = session_id,
                event = "invalid_code_format",
                code_length = submitted.len(),
                "Invalid OTP format submitted"
            );
            return Ok(self
                .reject(
                    session_id,
                    OtpFailure::InvalidFormat {
                        expected_length: self.config.otp_length,
                    },
                )
                .await);
        }

        let mut conflicts = 0u32;
        loop {
            let Some(mut record) = self.otp_repository.find_latest_by_session(session_id).await? else {
                return Ok(self.reject(session_id, OtpFailure::NoActiveCode).await);
            };

            let expected_version = record.version;
            let now = Utc::now();
            let result = verifier::verify(&mut record, submitted, now);

            let mutated = matches!(result, Ok(()) | Err(OtpFailure::Mismatch { .. }));
            if mutated {
                record.version = expected_version + 1;
                let applied = self
                    .otp_repository
                    .update_if_version(&record, expected_version)
                    .await?;

                if !applied {
                    conflicts += 1;
                    if conflicts > self.config.verify_conflict_retries {
                        tracing::error!(
                            session_id = session_id,
                            otp_id = %record.id,
                            conflicts = conflicts,
                            event = "otp_verify_conflict",
                            "Gave up verifying OTP after repeated concurrent updates"
                        );
                        return Err(DomainError::Conflict {
                            message: format!(
                                "OTP record {} kept changing during verification",
                                record.id
                            ),
                        });
                    }
                    tracing::debug!(
                        session_id = session_id,
                        otp_id = %record.id,
                        conflicts = conflicts,
                        "OTP record changed concurrently, re-evaluating"
                    );
                    continue;
                }
            }

            return match result {
                Ok(()) => {
                    tracing::info!(
                        session_id = session_id,
                        otp_id = %record.id,
                        event = "otp_verified",
                        "OTP verified"
                    );
                    self.sync_session(session_id, |s| s.mark_otp_verified(now))
                        .await;
                    self.audit.log_otp_verified(session_id, record.id).await;
                    Ok(VerifyOutcome::Verified { verified_at: now })
                }
                Err(failure) => {
                    tracing::warn!(
                        session_id = session_id,
                        otp_id = %record.id,
                        reason = failure.code(),
                        remaining_attempts = ?failure.remaining_attempts(),
                        event = "otp_verification_failed",
                        "OTP verification failed"
                    );
                    Ok(self.reject(session_id, failure).await)
                }
            };
        }
    }

    /// State of the newest record for a session, `None` if none was issued
    pub async fn otp_state(&self, session_id: &str) -> DomainResult<Option<OtpState>> {
        let record = self.otp_repository.find_latest_by_session(session_id).await?;
        Ok(record.map(|r| r.state_at(Utc::now())))
    }

    /// Clear an identity's request counter (administrative)
    pub async fn reset_rate_limit(&self, identity: &str) -> DomainResult<()> {
        let email = normalize_email(identity);
        tracing::info!(
            email = %mask_email(&email),
            event = "rate_limit_reset",
            "Clearing OTP rate limit"
        );
        self.rate_limiter.reset(&email).await
    }

    async fn issue(&self, identity: &str, session_id: &str, event: &'static str) -> DomainResult<IssueOutcome> {
        let email = normalize_email(identity);
        if !is_valid_email(&email) {
            return Err(DomainError::Validation {
                message: format!("Invalid email address: {}", mask_email(&email)),
            });
        }
        if session_id.trim().is_empty() {
            return Err(DomainError::Validation {
                message: "Session id must not be empty".to_string(),
            });
        }

        let masked = mask_email(&email);
        tracing::info!(session_id = session_id, email = %masked, event = event, "OTP requested");

        match self.rate_limiter.check_and_increment(&email).await? {
            RateLimitDecision::RateLimited { retry_after_seconds } => {
                tracing::warn!(
                    session_id = session_id,
                    email = %masked,
                    retry_after_seconds = retry_after_seconds,
                    event = "rate_limit_exceeded",
                    "OTP request rate limit exceeded"
                );
                self.audit
                    .log_otp_rate_limited(session_id, &email, retry_after_seconds)
                    .await;
                let failure = OtpFailure::RateLimited { retry_after_seconds };
                return Ok(IssueOutcome::RateLimited {
                    retry_after_seconds,
                    message: failure.message(),
                });
            }
            RateLimitDecision::Allowed { remaining } => {
                tracing::debug!(session_id = session_id, remaining = remaining, "OTP request admitted");
            }
        }

        let now = Utc::now();
        let code = codes::generate_code(self.config.otp_length);
        let salt = codes::generate_salt();
        let record = OtpRecord::issue(
            session_id,
            codes::hash_code(&code, &salt),
            salt,
            self.config.max_attempts,
            self.config.ttl_minutes,
            now,
        );

        self.otp_repository.create(&record).await.map_err(|e| {
            tracing::error!(
                session_id = session_id,
                error = %e,
                event = "otp_storage_failed",
                "Failed to store OTP record"
            );
            e
        })?;

        tracing::info!(
            session_id = session_id,
            otp_id = %record.id,
            expires_at = %record.expires_at,
            event = "otp_generated",
            "Generated new OTP"
        );

        match self.delivery.send(&email, &code, session_id).await {
            Ok(message_id) => {
                self.sync_session(session_id, |s| s.mark_otp_sent(now)).await;
                self.audit
                    .log_otp_sent(session_id, &email, record.id, &message_id)
                    .await;
                Ok(IssueOutcome::Sent {
                    record_id: record.id,
                    expires_at: record.expires_at,
                    message_id,
                    code,
                })
            }
            Err(e) => {
                tracing::error!(
                    session_id = session_id,
                    email = %masked,
                    error = %e,
                    event = "otp_delivery_failed",
                    "Failed to deliver OTP"
                );
                let reason = e.to_string();
                self.audit
                    .log_otp_delivery_failed(session_id, &email, &reason)
                    .await;
                Ok(IssueOutcome::DeliveryFailed { reason })
            }
        }
    }

    async fn reject(&self, session_id: &str, failure: OtpFailure) -> VerifyOutcome {
        self.audit.log_otp_failed(session_id, &failure).await;
        VerifyOutcome::Rejected(failure)
    }

    /// Follow a committed OTP change with the matching session transition
    ///
    /// The OTP record is the source of truth once written, so a session
    /// store failure is logged and does not fail the call.
    async fn sync_session<F>(&self, session_id: &str, transition: F) -> bool
    where
        F: FnOnce(&mut SignSession) -> bool,
    {
        match self.update_session(session_id, transition).await {
            Ok(updated) => updated,
            Err(e) => {
                tracing::error!(
                    session_id = session_id,
                    error = %e,
                    event = "session_sync_failed",
                    "Failed to update sign session status"
                );
                false
            }
        }
    }

    /// Apply a status transition if the session exists
    async fn update_session<F>(&self, session_id: &str, transition: F) -> DomainResult<bool>
    where
        F: FnOnce(&mut SignSession) -> bool,
    {
        let Some(mut session) = self.session_repository.find_by_id(session_id).await? else {
            tracing::debug!(session_id = session_id, "No sign session to update");
            return Ok(false);
        };

        if !transition(&mut session) {
            tracing::debug!(
                session_id = session_id,
                status = %session.status,
                "Sign session status left unchanged"
            );
            return Ok(false);
        }

        self.session_repository.update(&session).await?;
        Ok(true)
    }
}
