//! Per-identity OTP request rate limiting

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

use sft_shared::config::{OtpConfig, MAX_RATE_LIMIT_WINDOW_SECONDS};
use sft_shared::utils::email::normalize_email;

use crate::errors::{DomainError, DomainResult};

/// Outcome of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// Request admitted and counted
    Allowed { remaining: u32 },
    /// Ceiling reached; the counter was left untouched
    RateLimited { retry_after_seconds: u64 },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed { .. })
    }
}

/// Atomic check-then-increment counter with a ceiling per identity
///
/// Implementations must make the read, compare and increment a single
/// atomic step so concurrent callers can never push the counter past the
/// ceiling. Identities are normalized email addresses.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Admit and count a request, or reject it without mutating state
    async fn check_and_increment(&self, identity: &str) -> DomainResult<RateLimitDecision>;

    /// Clear the counter for an identity (administrative)
    async fn reset(&self, identity: &str) -> DomainResult<()>;
}

#[derive(Debug, Clone, Copy)]
struct WindowCounter {
    count: u32,
    resets_at: DateTime<Utc>,
}

/// Process-local fixed-window limiter
///
/// The window starts with the first admitted request and is not extended
/// by later ones. One mutex guards the whole read-modify-write.
pub struct InMemoryRateLimiter {
    limit: u32,
    window: Duration,
    counters: Mutex<HashMap<String, WindowCounter>>,
}

impl InMemoryRateLimiter {
    /// `window_seconds` is capped at [`MAX_RATE_LIMIT_WINDOW_SECONDS`]
    pub fn new(limit: u32, window_seconds: u64) -> Self {
        let window_seconds = window_seconds.min(MAX_RATE_LIMIT_WINDOW_SECONDS) as i64;
        Self {
            limit,
            window: Duration::seconds(window_seconds),
            counters: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &OtpConfig) -> Self {
        Self::new(config.rate_limit_per_hour, config.rate_limit_window_seconds)
    }

    /// Check-and-increment evaluated at `now`
    pub fn check_and_increment_at(
        &self,
        identity: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<RateLimitDecision> {
        let key = normalize_email(identity);
        let mut counters = self.lock()?;

        let live = counters.get(&key).copied().filter(|c| now < c.resets_at);

        match live {
            Some(counter) if counter.count >= self.limit => {
                let retry_after = (counter.resets_at - now).num_seconds().max(1) as u64;
                Ok(RateLimitDecision::RateLimited {
                    retry_after_seconds: retry_after,
                })
            }
            None if self.limit == 0 => Ok(RateLimitDecision::RateLimited {
                retry_after_seconds: self.window.num_seconds().max(1) as u64,
            }),
            Some(counter) => {
                let count = counter.count + 1;
                counters.insert(key, WindowCounter { count, ..counter });
                Ok(RateLimitDecision::Allowed {
                    remaining: self.limit - count,
                })
            }
            None => {
                counters.insert(
                    key,
                    WindowCounter {
                        count: 1,
                        resets_at: now + self.window,
                    },
                );
                Ok(RateLimitDecision::Allowed {
                    remaining: self.limit - 1,
                })
            }
        }
    }

    /// Current count for an identity at `now` (0 when absent or expired)
    pub fn count_at(&self, identity: &str, now: DateTime<Utc>) -> DomainResult<u32> {
        let counters = self.lock()?;
        Ok(counters
            .get(&normalize_email(identity))
            .filter(|c| now < c.resets_at)
            .map(|c| c.count)
            .unwrap_or(0))
    }

    /// Drop counters whose window has elapsed
    pub fn purge_expired(&self, now: DateTime<Utc>) -> DomainResult<usize> {
        let mut counters = self.lock()?;
        let before = counters.len();
        counters.retain(|_, c| now < c.resets_at);
        Ok(before - counters.len())
    }

    fn lock(&self) -> DomainResult<std::sync::MutexGuard<'_, HashMap<String, WindowCounter>>> {
        self.counters.lock().map_err(|_| DomainError::Internal {
            message: "Rate limiter state poisoned".to_string(),
        })
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn check_and_increment(&self, identity: &str) -> DomainResult<RateLimitDecision> {
        self.check_and_increment_at(identity, Utc::now())
    }

    async fn reset(&self, identity: &str) -> DomainResult<()> {
        self.lock()?.remove(&normalize_email(identity));
        Ok(())
    }
}
