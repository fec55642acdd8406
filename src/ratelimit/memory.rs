use super::{now_ms, FixedWindow, RateLimitDecision, RateLimiter};

use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;

/// Process-local fixed-window counter.
///
/// Suitable for a single gateway instance. Each identity keeps only the
/// counter of its current window; a stale window is reset on first use.
pub struct InMemoryRateLimiter {
    policy: FixedWindow,
    counters: DashMap<String, WindowCounter>,
}

#[derive(Debug, Clone, Copy)]
struct WindowCounter {
    bucket: u64,
    used: u64,
}

impl InMemoryRateLimiter {
    pub fn new(policy: FixedWindow) -> Self {
        Self {
            policy,
            counters: DashMap::new(),
        }
    }

    /// Consume one unit at an explicit time.
    pub fn consume_at(&self, identity: &str, now_ms: u64) -> RateLimitDecision {
        let bucket = self.policy.bucket(now_ms);
        // The entry guard holds the shard lock for the whole update.
        let mut counter = self
            .counters
            .entry(identity.to_string())
            .or_insert(WindowCounter { bucket, used: 0 });
        if counter.bucket != bucket {
            *counter = WindowCounter { bucket, used: 0 };
        }
        counter.used += 1;
        RateLimitDecision::from_usage(self.policy.limit, counter.used)
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn check_and_consume(&self, identity: &str) -> Result<RateLimitDecision> {
        Ok(self.consume_at(identity, now_ms()))
    }

    fn name(&self) -> &str {
        "memory"
    }
}
