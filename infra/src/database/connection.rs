//! Database connection pool management

use sqlx::{mysql::MySqlPoolOptions, MySqlPool};
use std::time::Duration;

use sft_shared::config::DatabaseConfig;

use crate::InfrastructureError;

/// MySQL connection pool wrapper
#[derive(Clone)]
pub struct DatabasePool {
    pool: MySqlPool,
}

impl DatabasePool {
    /// Create a pool from configuration and verify it can connect
    pub async fn new(config: &DatabaseConfig) -> Result<Self, InfrastructureError> {
        if !config.url.starts_with("mysql://") {
            return Err(InfrastructureError::Config(
                "Database URL must use the mysql:// scheme".to_string(),
            ));
        }

        tracing::info!(
            max_connections = config.max_connections,
            "Creating database connection pool"
        );

        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(config.connect_timeout))
            .idle_timeout(Duration::from_secs(config.idle_timeout))
            .max_lifetime(Duration::from_secs(1800))
            .test_before_acquire(true)
            .connect(&config.url)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to create database pool");
                InfrastructureError::Database(e)
            })?;

        tracing::info!("Database connection pool created successfully");
        Ok(Self { pool })
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn get_pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Run `SELECT 1`
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        let value: i32 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Database health check failed");
                InfrastructureError::Database(e)
            })?;
        Ok(value == 1)
    }

    pub fn get_statistics(&self) -> PoolStatistics {
        PoolStatistics {
            connections: self.pool.size(),
            idle_connections: self.pool.num_idle(),
            max_connections: self.pool.options().get_max_connections(),
        }
    }

    pub async fn close(&self) {
        tracing::info!("Closing database connection pool");
        self.pool.close().await;
    }
}

/// Connection pool statistics
#[derive(Debug, Clone)]
pub struct PoolStatistics {
    pub connections: u32,
    pub idle_connections: usize,
    pub max_connections: u32,
}

impl std::fmt::Display for PoolStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Pool Stats: {}/{} connections ({} idle)",
            self.connections, self.max_connections, self.idle_connections
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pool_creation_with_invalid_url() {
        let config = DatabaseConfig::new("postgres://localhost/smartfiletools");
        let result = DatabasePool::new(&config).await;
        assert!(matches!(result, Err(InfrastructureError::Config(_))));
    }

    #[test]
    fn test_pool_statistics_display() {
        let stats = PoolStatistics {
            connections: 5,
            idle_connections: 3,
            max_connections: 10,
        };
        assert_eq!(stats.to_string(), "Pool Stats: 5/10 connections (3 idle)");
    }
}
