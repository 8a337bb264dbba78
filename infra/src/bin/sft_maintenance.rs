//! Session expiry and OTP purge job
//!
//! Runs one sweep and exits. With `--daemon` it keeps sweeping every
//! `maintenance.interval_seconds` until interrupted.

use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;

use sft_core::services::audit::{AuditService, AuditServiceConfig};
use sft_core::services::maintenance::MaintenanceService;
use sft_infra::database::{DatabasePool, MySqlAuditRepository, MySqlOtpRepository, MySqlSessionRepository};
use sft_infra::telemetry::init_tracing;
use sft_shared::config::AppConfig;

fn print_usage(bin_name: &str) {
    eprintln!("Usage: {bin_name} [--daemon]");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = std::env::args();
    let bin_name = args.next().unwrap_or_else(|| "sft-maintenance".to_string());
    let daemon = match args.next().as_deref() {
        None => false,
        Some("--daemon") => true,
        Some(_) => {
            print_usage(&bin_name);
            std::process::exit(2);
        }
    };

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.logging)?;

    tracing::info!(environment = %config.environment, daemon = daemon, "Starting maintenance job");

    let db = DatabasePool::new(&config.database).await?;
    let pool = db.get_pool().clone();

    let audit = Arc::new(AuditService::new(
        Arc::new(MySqlAuditRepository::new(pool.clone())),
        AuditServiceConfig { async_writes: false },
    ));
    let service = Arc::new(MaintenanceService::new(
        Arc::new(MySqlSessionRepository::new(pool.clone())),
        Arc::new(MySqlOtpRepository::new(pool)),
        audit,
        config.maintenance.clone(),
    ));

    if daemon {
        let Some(handle) = Arc::clone(&service).spawn() else {
            anyhow::bail!("Maintenance is disabled in configuration");
        };
        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for shutdown signal")?;
        handle.abort();
        tracing::info!("Maintenance job stopped");
    } else {
        let report = service.run_once(Utc::now()).await?;
        println!(
            "Maintenance completed: sessions_expired={}, otps_purged={}, errors={}",
            report.sessions_expired,
            report.otps_purged,
            report.errors.len()
        );
        if !report.is_success() {
            db.close().await;
            std::process::exit(1);
        }
    }

    db.close().await;
    Ok(())
}
