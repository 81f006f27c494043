//! In-process sliding-window limiter.
//!
//! Keeps a log of accepted timestamps per key and forgets entries once they
//! leave the window. State lives in one process only, so this backend is for
//! local runs and tests; deployments with several replicas use the Redis one.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::data::rate_limiter::{RateLimitDecision, RateLimiter};
use crate::domain::error::DomainError;

const CLEANUP_INTERVAL: u64 = 256;

pub(crate) struct InMemoryRateLimiter {
    quota: u32,
    window: Duration,
    log: Mutex<HashMap<String, VecDeque<Instant>>>,
    checks: AtomicU64,
}

impl InMemoryRateLimiter {
    pub(crate) fn new(quota: u32, window: Duration) -> Self {
        Self {
            quota,
            window,
            log: Mutex::new(HashMap::new()),
            checks: AtomicU64::new(0),
        }
    }

    pub(crate) fn check_at(&self, key: &str, now: Instant) -> RateLimitDecision {
        let count = self.checks.fetch_add(1, Ordering::Relaxed);
        let mut log = self
            .log
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        if count > 0 && count % CLEANUP_INTERVAL == 0 {
            let window = self.window;
            log.retain(|_, stamps| {
                evict_expired(stamps, now, window);
                !stamps.is_empty()
            });
            debug!(tracked_keys = log.len(), "rate limiter cleanup");
        }

        let stamps = log.entry(key.to_string()).or_default();
        evict_expired(stamps, now, self.window);

        if stamps.len() >= self.quota as usize {
            warn!(key, requests = stamps.len(), max = self.quota, "rate limit exceeded");
            return RateLimitDecision::Denied;
        }

        stamps.push_back(now);
        RateLimitDecision::Allowed
    }
}

fn evict_expired(stamps: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(oldest) = stamps.front() {
        if now.saturating_duration_since(*oldest) >= window {
            stamps.pop_front();
        } else {
            break;
        }
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn check(&self, key: &str) -> Result<RateLimitDecision, DomainError> {
        Ok(self.check_at(key, Instant::now()))
    }
}
