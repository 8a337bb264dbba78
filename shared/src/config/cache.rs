//! Cache configuration module

use serde::{Deserialize, Serialize};

use super::env_or;

/// Where transient counters (OTP rate limits) live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// Shared Redis instance, required when several processes serve requests
    Redis,
    /// Process-local map, for development and single-process deployments
    Memory,
}

impl std::str::FromStr for CacheBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "redis" => Ok(CacheBackend::Redis),
            "memory" | "local" => Ok(CacheBackend::Memory),
            _ => Err(format!("Invalid cache backend: {}", s)),
        }
    }
}

/// Redis cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Backend used for rate limit counters
    #[serde(default = "default_backend")]
    pub backend: CacheBackend,

    /// Redis connection URL
    #[serde(default = "default_url")]
    pub url: String,

    /// Connection attempts before giving up at startup
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay between retries in milliseconds (doubled per attempt)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Prefix prepended to every key
    #[serde(default)]
    pub key_prefix: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            url: default_url(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            key_prefix: None,
        }
    }
}

impl CacheConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let key_prefix = std::env::var("REDIS_KEY_PREFIX").ok().filter(|p| !p.is_empty());

        Self {
            backend: env_or("CACHE_BACKEND", default_backend()),
            url: std::env::var("REDIS_URL").unwrap_or_else(|_| default_url()),
            max_retries: env_or("REDIS_MAX_RETRIES", default_max_retries()),
            retry_delay_ms: env_or("REDIS_RETRY_DELAY_MS", default_retry_delay_ms()),
            key_prefix,
        }
    }

    /// Create a new Redis-backed cache configuration with URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the key prefix for all cache keys
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Generate a cache key with prefix
    pub fn make_key(&self, key: &str) -> String {
        match &self.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.to_string(),
        }
    }
}

fn default_backend() -> CacheBackend {
    CacheBackend::Redis
}

fn default_url() -> String {
    String::from("redis://localhost:6379")
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    100
}
