use super::{now_ms, FixedWindow, RateLimitDecision, RateLimiter};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

/// Increment the window counter and arm its expiry on first hit. Runs
/// server-side so the pair is atomic.
const FIXED_WINDOW_SCRIPT: &str = r#"
local key = KEYS[1]
local window = ARGV[1]
local r = redis.call("INCR", key)
if r == 1 then
  redis.call("PEXPIRE", key, window)
end
return r
"#;

/// Fixed-window limiter backed by Upstash Redis over its REST API.
pub struct UpstashRateLimiter {
    url: String,
    token: String,
    policy: FixedWindow,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct UpstashResponse {
    result: Option<serde_json::Value>,
    error: Option<String>,
}

impl UpstashRateLimiter {
    pub fn new(url: String, token: String, policy: FixedWindow) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            token,
            policy,
            client: Client::new(),
        }
    }

    async fn eval_increment(&self, key: &str) -> Result<u64> {
        let command = serde_json::json!([
            "EVAL",
            FIXED_WINDOW_SCRIPT,
            "1",
            key,
            self.policy.window_ms().to_string(),
        ]);

        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(&command)
            .send()
            .await
            .context("Upstash request failed")?;

        let status = resp.status();
        let body: UpstashResponse = resp
            .json()
            .await
            .with_context(|| format!("Failed to decode Upstash response ({status})"))?;

        if let Some(error) = body.error {
            anyhow::bail!("Upstash error ({}): {}", status, error);
        }

        body.result
            .as_ref()
            .and_then(|v| v.as_u64())
            .ok_or_else(|| anyhow::anyhow!("Unexpected Upstash result: {:?}", body.result))
    }
}

#[async_trait]
impl RateLimiter for UpstashRateLimiter {
    async fn check_and_consume(&self, identity: &str) -> Result<RateLimitDecision> {
        let key = self.policy.key(identity, now_ms());
        let used = self.eval_increment(&key).await?;
        debug!(%key, used, limit = self.policy.limit, "Upstash window counter");
        Ok(RateLimitDecision::from_usage(self.policy.limit, used))
    }

    fn name(&self) -> &str {
        "upstash"
    }
}
