//! Sliding-window limiter backed by Redis.
//!
//! Every key is a sorted set of accepted request timestamps (milliseconds).
//! The Lua script drops members older than the window, counts the rest and
//! adds the new request only when the count is under the quota. Redis runs
//! scripts atomically, so concurrent creates from one author cannot both
//! take the last slot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{Client, Script};
use tracing::{info, warn};

use crate::data::rate_limiter::{RateLimitDecision, RateLimiter};
use crate::domain::error::DomainError;

pub(crate) const KEY_PREFIX: &str = "feed:ratelimit:";

const SLIDING_WINDOW_SCRIPT: &str = r#"
local key = KEYS[1]
local now = tonumber(ARGV[1])
local window = tonumber(ARGV[2])
local quota = tonumber(ARGV[3])
local member = ARGV[4]

redis.call('ZREMRANGEBYSCORE', key, '-inf', now - window)
local used = redis.call('ZCARD', key)
if used >= quota then
    return 0
end
redis.call('ZADD', key, now, member)
redis.call('PEXPIRE', key, window)
return 1
"#;

pub(crate) struct RedisRateLimiter {
    connection: ConnectionManager,
    script: Script,
    quota: u32,
    window: Duration,
    sequence: AtomicU64,
}

impl RedisRateLimiter {
    pub(crate) async fn connect(redis_url: &str, quota: u32, window: Duration) -> Result<Self> {
        let config = ConnectionManagerConfig::new()
            .set_number_of_retries(1)
            .set_connection_timeout(Duration::from_millis(500));

        let client = Client::open(redis_url).context("invalid REDIS_URL")?;
        let connection = client
            .get_connection_manager_with_config(config)
            .await
            .context("failed to connect to redis")?;

        info!("redis rate limiter ready");
        Ok(Self {
            connection,
            script: Script::new(SLIDING_WINDOW_SCRIPT),
            quota,
            window,
            sequence: AtomicU64::new(0),
        })
    }

    /// Sorted-set members must be unique, two requests can share a millisecond.
    fn next_member(&self, now_ms: u64) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("{now_ms}-{}-{seq}", std::process::id())
    }
}

pub(crate) fn limiter_key(key: &str) -> String {
    format!("{KEY_PREFIX}{key}")
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn check(&self, key: &str) -> Result<RateLimitDecision, DomainError> {
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?
            .as_millis() as u64;
        let window_ms = self.window.as_millis() as u64;

        let mut connection = self.connection.clone();
        let allowed: i64 = self
            .script
            .key(limiter_key(key))
            .arg(now_ms)
            .arg(window_ms)
            .arg(self.quota)
            .arg(self.next_member(now_ms))
            .invoke_async(&mut connection)
            .await
            .map_err(|err| DomainError::Unexpected(format!("rate limiter unavailable: {err}")))?;

        if allowed == 1 {
            Ok(RateLimitDecision::Allowed)
        } else {
            warn!(key, max = self.quota, "rate limit exceeded");
            Ok(RateLimitDecision::Denied)
        }
    }
}
