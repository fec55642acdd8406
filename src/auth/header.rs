//! Trusted-header identity.
//!
//! For deployments where an upstream proxy has already authenticated the
//! user and forwards the id in a header, and for local development. Never
//! expose this backend directly to the internet.

use super::{Identity, IdentityProvider};
use crate::ratelimit::RemainingQuota;

use anyhow::Result;
use async_trait::async_trait;
use axum::http::HeaderMap;
use dashmap::DashMap;

pub struct HeaderIdentityProvider {
    header: String,
    metadata: DashMap<String, RemainingQuota>,
}

impl HeaderIdentityProvider {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into().to_ascii_lowercase(),
            metadata: DashMap::new(),
        }
    }

    /// Last remaining-credits value recorded for a user.
    pub fn remaining(&self, user_id: &str) -> Option<RemainingQuota> {
        self.metadata.get(user_id).map(|r| *r)
    }
}

#[async_trait]
impl IdentityProvider for HeaderIdentityProvider {
    async fn current_identity(&self, headers: &HeaderMap) -> Result<Option<Identity>> {
        Ok(headers
            .get(self.header.as_str())
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(Identity::new))
    }

    async fn update_metadata(&self, identity: &Identity, remaining: RemainingQuota) -> Result<()> {
        self.metadata.insert(identity.user_id.clone(), remaining);
        Ok(())
    }

    fn name(&self) -> &str {
        "header"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[tokio::test]
    async fn reads_configured_header() {
        let provider = HeaderIdentityProvider::new("X-User-Id");
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_static("user_42"));
        let identity = provider.current_identity(&headers).await.unwrap();
        assert_eq!(identity, Some(Identity::new("user_42")));
    }

    #[tokio::test]
    async fn blank_header_is_anonymous() {
        let provider = HeaderIdentityProvider::new("x-user-id");
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_static("  "));
        assert_eq!(provider.current_identity(&headers).await.unwrap(), None);
        assert_eq!(provider.current_identity(&HeaderMap::new()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn records_metadata() {
        let provider = HeaderIdentityProvider::new("x-user-id");
        let id = Identity::new("u");
        provider
            .update_metadata(&id, RemainingQuota::Count(2))
            .await
            .unwrap();
        assert_eq!(provider.remaining("u"), Some(RemainingQuota::Count(2)));
        provider
            .update_metadata(&id, RemainingQuota::OwnKey)
            .await
            .unwrap();
        assert_eq!(provider.remaining("u"), Some(RemainingQuota::OwnKey));
    }
}
