//! Redis client with connection retry
//!
//! Wraps a multiplexed async connection. Transient failures are retried with
//! exponential backoff capped at five seconds.

use redis::{aio::MultiplexedConnection, AsyncCommands, Client, RedisError, RedisResult};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use sft_shared::config::CacheConfig;

use crate::InfrastructureError;

const MAX_BACKOFF_MS: u64 = 5000;

type RedisFuture<T> = Pin<Box<dyn Future<Output = RedisResult<T>> + Send>>;

/// Redis client shared by cache-backed components
#[derive(Clone)]
pub struct RedisClient {
    connection: MultiplexedConnection,
    config: CacheConfig,
}

impl RedisClient {
    /// Connect using `config.url`, retrying up to `config.max_retries` times
    pub async fn new(config: CacheConfig) -> Result<Self, InfrastructureError> {
        info!(url = %mask_url(&config.url), "Creating Redis client");

        let client = Client::open(config.url.as_str()).map_err(|e| {
            error!(error = %e, "Failed to parse Redis URL");
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let connection =
            Self::connect_with_retry(&client, config.max_retries, config.retry_delay_ms).await?;

        info!("Redis client created successfully");
        Ok(Self { connection, config })
    }

    async fn connect_with_retry(
        client: &Client,
        max_retries: u32,
        retry_delay_ms: u64,
    ) -> Result<MultiplexedConnection, InfrastructureError> {
        let mut attempts = 0;
        let mut delay = retry_delay_ms;

        loop {
            attempts += 1;
            match client.get_multiplexed_async_connection().await {
                Ok(connection) => return Ok(connection),
                Err(e) if attempts < max_retries => {
                    warn!(
                        attempt = attempts,
                        max_retries = max_retries,
                        error = %e,
                        "Failed to connect to Redis, retrying in {}ms",
                        delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(MAX_BACKOFF_MS);
                }
                Err(e) => {
                    error!(attempts = attempts, error = %e, "Failed to connect to Redis");
                    return Err(InfrastructureError::Cache(e));
                }
            }
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Prefix a key with the configured namespace
    pub fn make_key(&self, key: &str) -> String {
        self.config.make_key(key)
    }

    /// Run `operation` on a fresh handle, retrying transient errors
    pub(crate) async fn execute_with_retry<F, T>(&self, operation: F) -> RedisResult<T>
    where
        F: Fn(MultiplexedConnection) -> RedisFuture<T>,
    {
        let mut attempts = 0;
        let mut delay = self.config.retry_delay_ms;

        loop {
            attempts += 1;
            match operation(self.connection.clone()).await {
                Ok(result) => return Ok(result),
                Err(e) if attempts < self.config.max_retries && is_retriable_error(&e) => {
                    warn!(
                        attempt = attempts,
                        error = %e,
                        "Redis operation failed, retrying in {}ms",
                        delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(MAX_BACKOFF_MS);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Delete a key, returning whether it existed
    pub async fn delete(&self, key: &str) -> Result<bool, InfrastructureError> {
        let owned = key.to_string();
        let deleted = self
            .execute_with_retry(move |mut conn| {
                let key = owned.clone();
                Box::pin(async move { conn.del::<_, u32>(key).await })
            })
            .await
            .map_err(|e| {
                error!(key = key, error = %e, "Failed to delete key");
                InfrastructureError::Cache(e)
            })?;

        debug!(key = key, deleted = deleted > 0, "Deleted key");
        Ok(deleted > 0)
    }

    /// Remaining time to live; `None` if the key is missing or has no expiry
    pub async fn ttl(&self, key: &str) -> Result<Option<i64>, InfrastructureError> {
        let owned = key.to_string();
        let ttl = self
            .execute_with_retry(move |mut conn| {
                let key = owned.clone();
                Box::pin(async move { conn.ttl::<_, i64>(key).await })
            })
            .await?;

        Ok((ttl >= 0).then_some(ttl))
    }

    /// PING the server
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        let response = self
            .execute_with_retry(|mut conn| {
                Box::pin(async move { redis::cmd("PING").query_async::<_, String>(&mut conn).await })
            })
            .await
            .map_err(|e| {
                error!(error = %e, "Redis health check failed");
                InfrastructureError::Cache(e)
            })?;

        if response != "PONG" {
            warn!(response = %response, "Redis health check returned unexpected response");
            return Ok(false);
        }
        Ok(true)
    }
}

pub(crate) fn is_retriable_error(error: &RedisError) -> bool {
    matches!(
        error.kind(),
        redis::ErrorKind::IoError | redis::ErrorKind::BusyLoadingError | redis::ErrorKind::TryAgain
    )
}

/// Hide credentials in a Redis URL for logging
pub(crate) fn mask_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(proto_end), Some(at_pos)) if at_pos > proto_end => {
            format!("{}****{}", &url[..proto_end + 3], &url[at_pos..])
        }
        _ => url.to_string(),
    }
}
