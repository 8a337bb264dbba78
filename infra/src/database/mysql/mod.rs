//! MySQL repository implementations

mod audit_repository_impl;
mod otp_repository_impl;
mod session_repository_impl;

pub use audit_repository_impl::MySqlAuditRepository;
pub use otp_repository_impl::MySqlOtpRepository;
pub use session_repository_impl::MySqlSessionRepository;

use sqlx::mysql::MySqlRow;
use sqlx::Row;

use sft_core::errors::DomainError;

/// Read a column, mapping decode failures to `DomainError::Internal`
pub(crate) fn column<'r, T>(row: &'r MySqlRow, name: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, sqlx::MySql> + sqlx::Type<sqlx::MySql>,
{
    row.try_get(name).map_err(|e| DomainError::Internal {
        message: format!("Failed to get {}: {}", name, e),
    })
}

pub(crate) fn query_error(context: &str, e: sqlx::Error) -> DomainError {
    tracing::error!(error = %e, "{}", context);
    DomainError::Internal {
        message: format!("{}: {}", context, e),
    }
}
