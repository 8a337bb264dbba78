//! Redis-backed OTP request rate limiter
//!
//! The check and the increment run inside one Lua script, so concurrent
//! requests across processes can never admit more than the ceiling. The
//! window starts at the first admitted request and a rejection never
//! changes the count.
//!
//! A counter found at the ceiling without a TTL (its `EXPIRE` was lost, or
//! the key was written by hand) is given a fresh window on rejection.
//! Otherwise it would block the identity until someone reset it.

use async_trait::async_trait;
use redis::Script;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, error};

use sft_core::errors::{DomainError, DomainResult};
use sft_core::services::otp::{RateLimitDecision, RateLimiter};
use sft_shared::config::OtpConfig;
use sft_shared::utils::email::normalize_email;

use super::redis_client::RedisClient;

/// Namespace of the per-identity counters
pub const RATE_LIMIT_KEY_PREFIX: &str = "esign_otp_rate_limit";

// KEYS[1] counter, ARGV[1] limit, ARGV[2] window seconds.
// Returns {admitted, count, ttl}. TTL -1 means the key has no expiry.
const CHECK_AND_INCREMENT: &str = r#"
local limit = tonumber(ARGV[1])
local window = tonumber(ARGV[2])
local current = tonumber(redis.call('GET', KEYS[1]) or '0')

if current >= limit then
    local ttl = redis.call('TTL', KEYS[1])
    if ttl == -1 then
        redis.call('EXPIRE', KEYS[1], window)
        ttl = window
    end
    return {0, current, ttl}
end

current = redis.call('INCR', KEYS[1])
if current == 1 then
    redis.call('EXPIRE', KEYS[1], window)
end
return {1, current, redis.call('TTL', KEYS[1])}
"#;

/// Fixed-window limiter shared by every process pointing at the same Redis
pub struct RedisRateLimiter {
    redis_client: Arc<RedisClient>,
    limit: u32,
    window_seconds: u64,
    script: Script,
}

impl RedisRateLimiter {
    pub fn new(redis_client: Arc<RedisClient>, limit: u32, window_seconds: u64) -> Self {
        Self {
            redis_client,
            limit,
            window_seconds,
            script: Script::new(CHECK_AND_INCREMENT),
        }
    }

    pub fn from_config(redis_client: Arc<RedisClient>, config: &OtpConfig) -> Self {
        Self::new(
            redis_client,
            config.rate_limit_per_hour,
            config.rate_limit_window_seconds,
        )
    }

    /// Counter key for an identity; the address itself never reaches Redis
    pub fn key_for(&self, identity: &str) -> String {
        self.redis_client.make_key(&counter_key(identity))
    }
}

/// `esign_otp_rate_limit:{sha256(normalized email)}`
pub(crate) fn counter_key(identity: &str) -> String {
    let digest = Sha256::digest(normalize_email(identity).as_bytes());
    format!("{}:{}", RATE_LIMIT_KEY_PREFIX, hex::encode(digest))
}

/// Map the script reply onto a decision
pub(crate) fn decision_from_reply(
    reply: &[i64],
    limit: u32,
    window_seconds: u64,
) -> DomainResult<RateLimitDecision> {
    let [admitted, count, ttl] = reply else {
        return Err(DomainError::Internal {
            message: format!("Unexpected rate limit script reply: {:?}", reply),
        });
    };

    if *admitted == 1 {
        let used = u32::try_from(*count).unwrap_or(u32::MAX);
        Ok(RateLimitDecision::Allowed {
            remaining: limit.saturating_sub(used),
        })
    } else {
        let retry_after_seconds = if *ttl > 0 { *ttl as u64 } else { window_seconds };
        Ok(RateLimitDecision::RateLimited {
            retry_after_seconds: retry_after_seconds.max(1),
        })
    }
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn check_and_increment(&self, identity: &str) -> DomainResult<RateLimitDecision> {
        let key = self.key_for(identity);
        let limit = self.limit;
        let window = self.window_seconds;
        let script = self.script.clone();

        let reply: Vec<i64> = self
            .redis_client
            .execute_with_retry(move |mut conn| {
                let script = script.clone();
                let key = key.clone();
                Box::pin(async move {
                    script
                        .key(key)
                        .arg(limit)
                        .arg(window)
                        .invoke_async::<_, Vec<i64>>(&mut conn)
                        .await
                })
            })
            .await
            .map_err(|e| {
                error!(error = %e, event = "rate_limit_store_error", "Rate limit check failed");
                DomainError::Internal {
                    message: format!("Failed to check rate limit: {}", e),
                }
            })?;

        let decision = decision_from_reply(&reply, limit, window)?;
        debug!(decision = ?decision, "Rate limit evaluated");
        Ok(decision)
    }

    async fn reset(&self, identity: &str) -> DomainResult<()> {
        self.redis_client.delete(&self.key_for(identity)).await?;
        Ok(())
    }
}
