//! Session expiry and OTP purge sweep
//!
//! Sessions that outlived `expires_at` while still active are moved to
//! `Expired`, and OTP records that expired longer ago than the retention
//! window are deleted.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use sft_shared::config::{MaintenanceConfig, MAX_OTP_RETENTION_HOURS};

use crate::errors::DomainError;
use crate::repositories::{AuditRepository, NoOpAuditRepository, OtpRepository, SessionRepository};
use crate::services::audit::AuditService;

/// Maximum sessions expired per repository query
pub const SESSION_BATCH_SIZE: usize = 500;

/// Sweeps stale sessions and purges old OTP records
pub struct MaintenanceService<S, R, A = NoOpAuditRepository>
where
    S: SessionRepository + 'static,
    R: OtpRepository + 'static,
    A: AuditRepository + 'static,
{
    session_repository: Arc<S>,
    otp_repository: Arc<R>,
    audit: Arc<AuditService<A>>,
    config: MaintenanceConfig,
}

impl<S, R, A> MaintenanceService<S, R, A>
where
    S: SessionRepository + 'static,
    R: OtpRepository + 'static,
    A: AuditRepository + 'static,
{
    pub fn new(
        session_repository: Arc<S>,
        otp_repository: Arc<R>,
        audit: Arc<AuditService<A>>,
        config: MaintenanceConfig,
    ) -> Self {
        Self {
            session_repository,
            otp_repository,
            audit,
            config,
        }
    }

    /// Run a single sweep as of `now`
    ///
    /// A failure in one step is recorded in the report and does not stop
    /// the other step.
    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<MaintenanceReport, DomainError> {
        info!(event = "maintenance_started", "Starting maintenance sweep");

        let mut report = MaintenanceReport::default();

        match self.expire_sessions(now, &mut report).await {
            Ok(count) => report.sessions_expired = count,
            Err(e) => {
                error!(error = %e, "Failed to expire sessions");
                report.errors.push(format!("Session expiry error: {}", e));
            }
        }

        match retention_cutoff(now, self.config.otp_retention_hours) {
            Some(cutoff) => match self.otp_repository.delete_expired_before(cutoff).await {
                Ok(count) => report.otps_purged = count,
                Err(e) => {
                    error!(error = %e, "Failed to purge expired OTP records");
                    report.errors.push(format!("OTP purge error: {}", e));
                }
            },
            None => {
                error!(
                    otp_retention_hours = self.config.otp_retention_hours,
                    "OTP retention out of range, purge skipped"
                );
                report.errors.push(format!(
                    "OTP purge error: retention of {} hours is out of range",
                    self.config.otp_retention_hours
                ));
            }
        }

        info!(
            event = "maintenance_completed",
            sessions_expired = report.sessions_expired,
            otps_purged = report.otps_purged,
            errors = report.errors.len(),
            "Maintenance sweep completed"
        );

        Ok(report)
    }

    async fn expire_sessions(
        &self,
        now: DateTime<Utc>,
        report: &mut MaintenanceReport,
    ) -> Result<usize, DomainError> {
        let mut expired = 0;

        loop {
            let batch = self
                .session_repository
                .find_expired_active(now, SESSION_BATCH_SIZE)
                .await?;
            let batch_len = batch.len();
            let mut progressed = false;

            for mut session in batch {
                let previous = session.status;
                if !session.expire(now) {
                    continue;
                }
                match self.session_repository.update(&session).await {
                    Ok(()) => {
                        expired += 1;
                        progressed = true;
                        self.audit
                            .log_session_expired(&session.id, previous.as_str())
                            .await;
                    }
                    Err(e) => {
                        warn!(session_id = %session.id, error = %e, "Failed to expire session");
                        report
                            .errors
                            .push(format!("Session {} expiry error: {}", session.id, e));
                    }
                }
            }

            // A short batch is the last one; a batch with no successful
            // update would be returned again.
            if batch_len < SESSION_BATCH_SIZE || !progressed {
                break;
            }
        }

        Ok(expired)
    }

    /// Run `run_once` every `interval_seconds` on a background task
    ///
    /// Returns `None` when maintenance is disabled.
    pub fn spawn(self: Arc<Self>) -> Option<JoinHandle<()>> {
        if !self.config.enabled {
            warn!("Maintenance service is disabled");
            return None;
        }

        let period = std::time::Duration::from_secs(self.config.interval_seconds);

        Some(tokio::spawn(async move {
            info!(
                interval_seconds = self.config.interval_seconds,
                "Maintenance service started"
            );

            let mut timer = tokio::time::interval(period);
            loop {
                timer.tick().await;

                match self.run_once(Utc::now()).await {
                    Ok(report) if !report.is_success() => {
                        warn!(errors = ?report.errors, "Maintenance completed with errors");
                    }
                    Ok(_) => {}
                    Err(e) => error!(error = %e, "Maintenance sweep failed"),
                }
            }
        }))
    }
}

/// Instant before which expired OTP records are purged
fn retention_cutoff(now: DateTime<Utc>, retention_hours: i64) -> Option<DateTime<Utc>> {
    if !(0..=MAX_OTP_RETENTION_HOURS).contains(&retention_hours) {
        return None;
    }
    now.checked_sub_signed(Duration::hours(retention_hours))
}

/// Summary of one sweep
#[derive(Debug, Default)]
pub struct MaintenanceReport {
    pub sessions_expired: usize,
    pub otps_purged: usize,
    pub errors: Vec<String>,
}

impl MaintenanceReport {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{AuditEventType, OtpRecord, SessionStatus, SignSession};
    use crate::repositories::{InMemoryOtpRepository, InMemorySessionRepository, MockAuditRepository};
    use crate::services::audit::AuditServiceConfig;

    struct Fixture {
        service: Arc<MaintenanceService<InMemorySessionRepository, InMemoryOtpRepository, MockAuditRepository>>,
        sessions: Arc<InMemorySessionRepository>,
        otps: Arc<InMemoryOtpRepository>,
        audit: Arc<MockAuditRepository>,
    }

    fn fixture(config: MaintenanceConfig) -> Fixture {
        let sessions = Arc::new(InMemorySessionRepository::new());
        let otps = Arc::new(InMemoryOtpRepository::new());
        let audit = Arc::new(MockAuditRepository::new());
        let service = MaintenanceService::new(
            Arc::clone(&sessions),
            Arc::clone(&otps),
            Arc::new(AuditService::new(
                Arc::clone(&audit),
                AuditServiceConfig { async_writes: false },
            )),
            config,
        );
        Fixture {
            service: Arc::new(service),
            sessions,
            otps,
            audit,
        }
    }

    #[tokio::test]
    async fn test_expires_only_stale_active_sessions() {
        let f = fixture(MaintenanceConfig::default());
        let now = Utc::now();
        let past = now - Duration::hours(2);

        let stale = SignSession::new("a@example.com", "A", 1, past);
        let fresh = SignSession::new("b@example.com", "B", 72, past);
        let mut signed = SignSession::new("c@example.com", "C", 1, past);
        signed.status = SessionStatus::Signed;
        for s in [&stale, &fresh, &signed] {
            f.sessions.create(s).await.unwrap();
        }

        let report = f.service.run_once(now).await.unwrap();

        assert!(report.is_success());
        assert_eq!(report.sessions_expired, 1);
        let stale = f.sessions.find_by_id(&stale.id).await.unwrap().unwrap();
        assert_eq!(stale.status, SessionStatus::Expired);
        let fresh = f.sessions.find_by_id(&fresh.id).await.unwrap().unwrap();
        assert_eq!(fresh.status, SessionStatus::Created);
        let signed = f.sessions.find_by_id(&signed.id).await.unwrap().unwrap();
        assert_eq!(signed.status, SessionStatus::Signed);

        let events = f.audit.get_all_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, AuditEventType::SessionExpired);
        assert_eq!(events[0].payload["previous_status"], "created");
    }

    #[tokio::test]
    async fn test_purges_records_past_retention() {
        let f = fixture(MaintenanceConfig {
            otp_retention_hours: 24,
            ..Default::default()
        });
        let now = Utc::now();

        let old = OtpRecord::issue("s-1", "h".into(), "s".into(), 5, 5, now - Duration::hours(30));
        let recent = OtpRecord::issue("s-2", "h".into(), "s".into(), 5, 5, now - Duration::hours(2));
        f.otps.create(&old).await.unwrap();
        f.otps.create(&recent).await.unwrap();

        let report = f.service.run_once(now).await.unwrap();

        assert_eq!(report.otps_purged, 1);
        let remaining = f.otps.all().await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, recent.id);
    }

    #[tokio::test]
    async fn test_second_run_is_noop() {
        let f = fixture(MaintenanceConfig::default());
        let now = Utc::now();
        let stale = SignSession::new("a@example.com", "A", 1, now - Duration::hours(2));
        f.sessions.create(&stale).await.unwrap();

        assert_eq!(f.service.run_once(now).await.unwrap().sessions_expired, 1);
        assert_eq!(f.service.run_once(now).await.unwrap().sessions_expired, 0);
        assert_eq!(f.audit.get_all_events().len(), 1);
    }

    #[tokio::test]
    async fn test_purge_failure_is_reported() {
        let f = fixture(MaintenanceConfig::default());
        f.otps.set_should_fail(true);

        let report = f.service.run_once(Utc::now()).await.unwrap();
        assert!(!report.is_success());
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].starts_with("OTP purge error"));
    }

    #[tokio::test]
    async fn test_out_of_range_retention_is_reported() {
        let f = fixture(MaintenanceConfig {
            otp_retention_hours: i64::MAX,
            ..Default::default()
        });
        let now = Utc::now();
        let old = OtpRecord::issue("s-1", "h".into(), "s".into(), 5, 5, now - Duration::hours(30));
        f.otps.create(&old).await.unwrap();

        let report = f.service.run_once(now).await.unwrap();

        assert_eq!(report.otps_purged, 0);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("out of range"));
        assert_eq!(f.otps.all().await.len(), 1);
    }

    #[tokio::test]
    async fn test_spawn_disabled() {
        let f = fixture(MaintenanceConfig {
            enabled: false,
            ..Default::default()
        });
        assert!(Arc::clone(&f.service).spawn().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawn_runs_on_interval() {
        let f = fixture(MaintenanceConfig {
            interval_seconds: 60,
            ..Default::default()
        });
        let stale = SignSession::new("a@example.com", "A", 1, Utc::now() - Duration::hours(2));
        f.sessions.create(&stale).await.unwrap();

        let handle = Arc::clone(&f.service).spawn().unwrap();
        // first tick fires immediately
        tokio::time::sleep(std::time::Duration::from_secs(1)).await;

        let stale = f.sessions.find_by_id(&stale.id).await.unwrap().unwrap();
        assert_eq!(stale.status, SessionStatus::Expired);
        handle.abort();
    }
}
