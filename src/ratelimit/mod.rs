//! Per-identity credit gating.
//!
//! Each signed-in user gets a fixed number of generations per fixed
//! wall-clock window. Counters live in a backend that provides atomic
//! increment per key; the gateway itself holds no counting state.

mod gate;
mod memory;
mod upstash;

pub use gate::CreditGate;
pub use memory::InMemoryRateLimiter;
pub use upstash::UpstashRateLimiter;

use crate::config::{RateLimitBackend, RateLimitConfig};

use anyhow::Result;
use async_trait::async_trait;
use serde::{Serialize, Serializer};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Types
// ============================================================================

/// Credits left for an identity, as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemainingQuota {
    Count(u32),
    /// The caller brought their own provider key; no quota applies.
    OwnKey,
}

impl Serialize for RemainingQuota {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            RemainingQuota::Count(n) => serializer.serialize_u32(*n),
            RemainingQuota::OwnKey => serializer.serialize_str("BYOK"),
        }
    }
}

/// Outcome of consuming one unit for an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: RemainingQuota,
}

impl RateLimitDecision {
    /// Decision for a window in which `used` units have now been consumed.
    pub fn from_usage(limit: u32, used: u64) -> Self {
        let remaining = u64::from(limit).saturating_sub(used) as u32;
        Self {
            allowed: used <= u64::from(limit),
            remaining: RemainingQuota::Count(remaining),
        }
    }

    pub fn own_key() -> Self {
        Self {
            allowed: true,
            remaining: RemainingQuota::OwnKey,
        }
    }
}

/// Fixed-window policy: `limit` units per `window`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedWindow {
    pub limit: u32,
    pub window: Duration,
    pub prefix: String,
}

impl FixedWindow {
    pub fn window_ms(&self) -> u64 {
        u64::try_from(self.window.as_millis())
            .unwrap_or(u64::MAX)
            .max(1)
    }

    /// Index of the window containing `now_ms`.
    pub fn bucket(&self, now_ms: u64) -> u64 {
        now_ms / self.window_ms()
    }

    /// Counter key for an identity in the window containing `now_ms`.
    pub fn key(&self, identity: &str, now_ms: u64) -> String {
        format!("{}:{}:{}", self.prefix, identity, self.bucket(now_ms))
    }
}

impl From<&RateLimitConfig> for FixedWindow {
    fn from(config: &RateLimitConfig) -> Self {
        Self {
            limit: config.limit,
            window: Duration::from_secs(config.window_secs),
            prefix: config.prefix.clone(),
        }
    }
}

pub(crate) fn now_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}

// ============================================================================
// Limiter Trait
// ============================================================================

#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Atomically consume one unit for `identity` in the current window.
    async fn check_and_consume(&self, identity: &str) -> Result<RateLimitDecision>;
    fn name(&self) -> &str;
}

// ============================================================================
// Limiter Resolution
// ============================================================================

/// Build the configured limiter, or `None` when gating is off.
pub fn resolve_rate_limiter(config: &RateLimitConfig) -> Result<Option<Arc<dyn RateLimiter>>> {
    let policy = FixedWindow::from(config);
    match config.backend {
        RateLimitBackend::Disabled => Ok(None),
        RateLimitBackend::Memory => Ok(Some(Arc::new(InMemoryRateLimiter::new(policy)))),
        RateLimitBackend::Upstash => {
            let url = config
                .upstash_url
                .clone()
                .ok_or_else(|| anyhow::anyhow!("Upstash rate limiting requires UPSTASH_REDIS_REST_URL"))?;
            let token = config
                .upstash_token
                .clone()
                .ok_or_else(|| anyhow::anyhow!("Upstash rate limiting requires UPSTASH_REDIS_REST_TOKEN"))?;
            Ok(Some(Arc::new(UpstashRateLimiter::new(url, token, policy))))
        }
    }
}
