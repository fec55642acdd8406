mod clerk;
mod header;

pub use clerk::ClerkIdentityProvider;
pub use header::HeaderIdentityProvider;

use crate::config::{AuthConfig, IdentityBackend};
use crate::ratelimit::RemainingQuota;

use anyhow::Result;
use async_trait::async_trait;
use axum::http::HeaderMap;
use std::sync::Arc;

// ============================================================================
// Types
// ============================================================================

/// A signed-in user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    pub user_id: String,
}

impl Identity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

// ============================================================================
// Provider Trait
// ============================================================================

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve the caller from request headers. `Ok(None)` means anonymous.
    async fn current_identity(&self, headers: &HeaderMap) -> Result<Option<Identity>>;

    /// Record the user's remaining credits in their profile metadata.
    async fn update_metadata(&self, identity: &Identity, remaining: RemainingQuota) -> Result<()>;

    fn name(&self) -> &str;
}

/// Build the configured identity provider.
pub fn resolve_identity_provider(config: &AuthConfig) -> Result<Arc<dyn IdentityProvider>> {
    match config.backend {
        IdentityBackend::Clerk => {
            let jwt_key = config
                .clerk_jwt_key
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("Clerk identity requires CLERK_JWT_KEY"))?;
            let secret_key = config
                .clerk_secret_key
                .clone()
                .ok_or_else(|| anyhow::anyhow!("Clerk identity requires CLERK_SECRET_KEY"))?;
            Ok(Arc::new(ClerkIdentityProvider::new(
                jwt_key,
                secret_key,
                config.clerk_api_url.clone(),
            )?))
        }
        IdentityBackend::Header => Ok(Arc::new(HeaderIdentityProvider::new(
            config.user_header.clone(),
        ))),
    }
}

// ============================================================================
// Token Extraction
// ============================================================================

/// Extract bearer token from an Authorization header value.
pub fn extract_bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_token_extraction() {
        assert_eq!(extract_bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("bearer   abc "), Some("abc"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
        assert_eq!(extract_bearer_token("Bearer"), None);
        assert_eq!(extract_bearer_token("Bearer   "), None);
        assert_eq!(extract_bearer_token("Beareré x"), None);
        assert_eq!(extract_bearer_token("ünïcode token"), None);
    }

    #[test]
    fn clerk_backend_requires_keys() {
        let config = AuthConfig {
            backend: IdentityBackend::Clerk,
            ..AuthConfig::default()
        };
        assert!(resolve_identity_provider(&config).is_err());
    }

    #[test]
    fn header_backend_resolves() {
        let provider = resolve_identity_provider(&AuthConfig::default()).unwrap();
        assert_eq!(provider.name(), "header");
    }
}
