//! Clerk session verification and user metadata updates.

use super::{extract_bearer_token, Identity, IdentityProvider};
use crate::ratelimit::RemainingQuota;

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::http::{header::AUTHORIZATION, HeaderMap};
use axum_extra::extract::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

/// Cookie Clerk's frontend SDK stores the session token in.
const SESSION_COOKIE: &str = "__session";

#[derive(Debug, Deserialize)]
struct SessionClaims {
    sub: String,
}

pub struct ClerkIdentityProvider {
    key: DecodingKey,
    validation: Validation,
    secret_key: String,
    api_url: String,
    client: Client,
}

impl ClerkIdentityProvider {
    /// `jwt_key` is Clerk's PEM public key (RS256). Anything that is not PEM
    /// is taken as an HS256 shared secret.
    pub fn new(jwt_key: &str, secret_key: String, api_url: String) -> Result<Self> {
        let (key, algorithm) = if jwt_key.trim_start().starts_with("-----BEGIN") {
            (
                DecodingKey::from_rsa_pem(jwt_key.as_bytes())
                    .context("Invalid Clerk JWT public key")?,
                Algorithm::RS256,
            )
        } else {
            (DecodingKey::from_secret(jwt_key.as_bytes()), Algorithm::HS256)
        };

        let mut validation = Validation::new(algorithm);
        validation.validate_aud = false;

        Ok(Self {
            key,
            validation,
            secret_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        })
    }

    fn session_token(headers: &HeaderMap) -> Option<String> {
        if let Some(token) = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(extract_bearer_token)
        {
            return Some(token.to_string());
        }
        CookieJar::from_headers(headers)
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_string())
    }
}

#[async_trait]
impl IdentityProvider for ClerkIdentityProvider {
    async fn current_identity(&self, headers: &HeaderMap) -> Result<Option<Identity>> {
        let Some(token) = Self::session_token(headers) else {
            return Ok(None);
        };

        match decode::<SessionClaims>(&token, &self.key, &self.validation) {
            Ok(data) => Ok(Some(Identity::new(data.claims.sub))),
            Err(e) => {
                debug!("Rejected Clerk session token: {}", e);
                Ok(None)
            }
        }
    }

    async fn update_metadata(&self, identity: &Identity, remaining: RemainingQuota) -> Result<()> {
        let resp = self
            .client
            .patch(format!("{}/v1/users/{}/metadata", self.api_url, identity.user_id))
            .bearer_auth(&self.secret_key)
            .json(&serde_json::json!({
                "unsafe_metadata": { "remaining": remaining }
            }))
            .send()
            .await
            .context("Clerk metadata request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Clerk API error ({}): {}", status, text);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "clerk"
    }
}
