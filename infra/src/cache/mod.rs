//! Cache module for Redis-backed state
//!
//! Provides the Redis client with connection retry and the atomic
//! per-identity OTP rate limiter.

pub mod rate_limiter;
pub mod redis_client;

pub use rate_limiter::{RedisRateLimiter, RATE_LIMIT_KEY_PREFIX};
pub use redis_client::RedisClient;

// Re-export commonly used types
pub use sft_shared::config::CacheConfig;
