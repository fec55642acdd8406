use super::{RateLimitDecision, RateLimiter, RemainingQuota};
use crate::auth::{Identity, IdentityProvider};
use crate::logo::GenerationError;

use std::sync::Arc;
use tracing::{info, warn};

/// Decides whether a request may spend a shared-key generation.
///
/// Callers with their own provider key skip counting entirely. Otherwise the
/// limiter is consulted once per request, and only when both a limiter and a
/// caller identity exist.
#[derive(Clone, Default)]
pub struct CreditGate {
    limiter: Option<Arc<dyn RateLimiter>>,
    identity: Option<Arc<dyn IdentityProvider>>,
}

impl CreditGate {
    pub fn new(
        limiter: Option<Arc<dyn RateLimiter>>,
        identity: Option<Arc<dyn IdentityProvider>>,
    ) -> Self {
        Self { limiter, identity }
    }

    pub fn is_limited(&self) -> bool {
        self.limiter.is_some()
    }

    /// Returns the decision, or `None` when no gating applied.
    pub async fn check(
        &self,
        user: Option<&Identity>,
        byok: bool,
    ) -> Result<Option<RateLimitDecision>, GenerationError> {
        if byok {
            if let Some(user) = user {
                self.record(user, RemainingQuota::OwnKey).await;
            }
            return Ok(Some(RateLimitDecision::own_key()));
        }

        let (Some(limiter), Some(user)) = (&self.limiter, user) else {
            return Ok(None);
        };

        let decision = limiter.check_and_consume(&user.user_id).await?;
        info!(
            user = %user.user_id,
            allowed = decision.allowed,
            remaining = ?decision.remaining,
            limiter = limiter.name(),
            "Credit gate decision"
        );
        self.record(user, decision.remaining).await;

        if !decision.allowed {
            return Err(GenerationError::QuotaExhausted);
        }
        Ok(Some(decision))
    }

    /// Metadata is informational; failing to write it never fails the request.
    async fn record(&self, user: &Identity, remaining: RemainingQuota) {
        if let Some(identity) = &self.identity {
            if let Err(e) = identity.update_metadata(user, remaining).await {
                warn!(user = %user.user_id, "Failed to update remaining credits: {:#}", e);
            }
        }
    }
}
