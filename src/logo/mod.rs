//! The logo generation pipeline.
//!
//! identity → validation → prompt composition → credit gate → provider call.
//! Every check that can fail without the network runs before the provider
//! is contacted.

mod error;
pub mod models;
pub mod prompt;
mod request;
pub mod sanitize;

pub use error::{GenerationError, Result};
pub use models::{ModelEntry, DEFAULT_MODEL_ID};
pub use prompt::{compose, Style};
pub use request::{validate, GenerationRequest, RawGenerationRequest};
pub use sanitize::sanitize;

use crate::auth::{Identity, IdentityProvider};
use crate::providers::{GeneratedImage, ImageProvider, ImageRequest};
use crate::ratelimit::CreditGate;

use axum::http::HeaderMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Output dimensions for every generated logo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ImageSize {
    fn default() -> Self {
        Self {
            width: crate::config::DEFAULT_IMAGE_SIZE,
            height: crate::config::DEFAULT_IMAGE_SIZE,
        }
    }
}

/// Turns a raw form submission into one provider call.
///
/// Collaborators are injected. Without an identity provider, requests are
/// anonymous and never gated; without a limiter, signed-in users are not
/// counted.
#[derive(Clone)]
pub struct LogoPipeline {
    provider: Arc<dyn ImageProvider>,
    identity: Option<Arc<dyn IdentityProvider>>,
    gate: CreditGate,
    size: ImageSize,
}

impl LogoPipeline {
    pub fn new(
        provider: Arc<dyn ImageProvider>,
        identity: Option<Arc<dyn IdentityProvider>>,
        gate: CreditGate,
        size: ImageSize,
    ) -> Self {
        Self {
            provider,
            identity,
            gate,
            size,
        }
    }

    pub fn auth_enabled(&self) -> bool {
        self.identity.is_some()
    }

    /// Resolve the caller. Fails with `Unauthenticated` when identity is
    /// required and absent.
    async fn caller(&self, headers: &HeaderMap) -> Result<Option<Identity>> {
        let Some(identity) = &self.identity else {
            return Ok(None);
        };
        match identity.current_identity(headers).await? {
            Some(user) => Ok(Some(user)),
            None => Err(GenerationError::Unauthenticated),
        }
    }

    /// Handle one generation request end to end.
    pub async fn generate(&self, headers: &HeaderMap, body: &[u8]) -> Result<GeneratedImage> {
        let user = self.caller(headers).await?;
        let request = GenerationRequest::from_json(body)?;
        self.generate_validated(user.as_ref(), request).await
    }

    /// Run the pipeline for an already validated request.
    pub async fn generate_validated(
        &self,
        user: Option<&Identity>,
        request: GenerationRequest,
    ) -> Result<GeneratedImage> {
        let prompt = compose(&request);
        debug!(chars = prompt.len(), "Composed logo prompt");

        let decision = self.gate.check(user, request.is_byok()).await?;

        info!(
            model = request.model.model_id,
            style = %request.style,
            byok = request.is_byok(),
            remaining = ?decision.map(|d| d.remaining),
            provider = self.provider.name(),
            "Generating logo"
        );

        self.provider
            .generate(ImageRequest {
                prompt,
                model: request.model.model_id.to_string(),
                width: self.size.width,
                height: self.size.height,
                steps: request.model.default_steps,
                reference_image: request.reference_image,
                api_key_override: request.api_key_override,
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::HeaderIdentityProvider;
    use crate::ratelimit::{FixedWindow, InMemoryRateLimiter, RemainingQuota};
    use async_trait::async_trait;
    use axum::http::HeaderValue;
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Records every request instead of calling out.
    #[derive(Default)]
    struct RecordingProvider {
        calls: Mutex<Vec<ImageRequest>>,
    }

    #[async_trait]
    impl ImageProvider for RecordingProvider {
        async fn generate(&self, request: ImageRequest) -> Result<GeneratedImage> {
            self.calls.lock().unwrap().push(request);
            Ok(GeneratedImage {
                b64_json: "aW1n".to_string(),
                index: 0,
            })
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    struct Harness {
        pipeline: LogoPipeline,
        provider: Arc<RecordingProvider>,
        identity: Arc<HeaderIdentityProvider>,
    }

    fn harness(limit: Option<u32>) -> Harness {
        let provider = Arc::new(RecordingProvider::default());
        let identity = Arc::new(HeaderIdentityProvider::new("x-user-id"));
        let limiter = limit.map(|limit| {
            Arc::new(InMemoryRateLimiter::new(FixedWindow {
                limit,
                window: Duration::from_secs(3600),
                prefix: "test".to_string(),
            })) as Arc<dyn crate::ratelimit::RateLimiter>
        });
        let pipeline = LogoPipeline::new(
            provider.clone(),
            Some(identity.clone()),
            CreditGate::new(limiter, Some(identity.clone())),
            ImageSize::default(),
        );
        Harness {
            pipeline,
            provider,
            identity,
        }
    }

    fn signed_in(user: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_str(user).unwrap());
        headers
    }

    fn body(value: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    fn form() -> serde_json::Value {
        json!({
            "companyName": "Sam's Burgers!!",
            "selectedStyle": "Minimal",
            "selectedModel": "black-forest-labs/FLUX.1-schnell",
            "selectedPrimaryColor": "#112233",
            "selectedBackgroundColor": "White",
        })
    }

    #[tokio::test]
    async fn forwards_derived_parameters() {
        let h = harness(None);
        let image = h.pipeline.generate(&signed_in("u1"), &body(form())).await.unwrap();
        assert_eq!(image.b64_json, "aW1n");

        let calls = h.provider.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let call = &calls[0];
        assert_eq!(call.model, "black-forest-labs/FLUX.1-schnell");
        assert_eq!(call.steps, Some(4));
        assert_eq!((call.width, call.height), (768, 768));
        assert!(call.prompt.contains("The company name is Sams Burgers,"));
        assert!(call.prompt.contains("#112233"));
        assert!(call.prompt.contains("Use white as the background color"));
        assert_eq!(call.api_key_override, None);
    }

    #[tokio::test]
    async fn anonymous_caller_rejected_when_auth_enabled() {
        let h = harness(None);
        let err = h
            .pipeline
            .generate(&HeaderMap::new(), &body(form()))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Unauthenticated));
        assert!(h.provider.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn auth_disabled_allows_anonymous_and_skips_gate() {
        let provider = Arc::new(RecordingProvider::default());
        let limiter: Arc<dyn crate::ratelimit::RateLimiter> =
            Arc::new(InMemoryRateLimiter::new(FixedWindow {
                limit: 1,
                window: Duration::from_secs(3600),
                prefix: "test".to_string(),
            }));
        let pipeline = LogoPipeline::new(
            provider.clone(),
            None,
            CreditGate::new(Some(limiter), None),
            ImageSize::default(),
        );
        assert!(!pipeline.auth_enabled());
        for _ in 0..3 {
            pipeline.generate(&HeaderMap::new(), &body(form())).await.unwrap();
        }
        assert_eq!(provider.calls.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn unknown_model_never_reaches_provider() {
        let h = harness(Some(5));
        let mut f = form();
        f["selectedModel"] = json!("acme/imaginary");
        let err = h.pipeline.generate(&signed_in("u1"), &body(f)).await.unwrap_err();
        assert!(matches!(err, GenerationError::UnknownModel(_)));
        assert!(h.provider.calls.lock().unwrap().is_empty());
        // Validation failures do not spend credits.
        assert_eq!(h.identity.remaining("u1"), None);
    }

    #[tokio::test]
    async fn canny_without_reference_never_reaches_provider() {
        let h = harness(None);
        let mut f = form();
        f["selectedModel"] = json!("black-forest-labs/FLUX.1-canny");
        let err = h.pipeline.generate(&signed_in("u1"), &body(f)).await.unwrap_err();
        assert!(matches!(err, GenerationError::MissingReferenceImage(_)));
        assert!(h.provider.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn exhausted_quota_blocks_call() {
        let h = harness(Some(1));
        let headers = signed_in("u1");
        h.pipeline.generate(&headers, &body(form())).await.unwrap();
        let err = h.pipeline.generate(&headers, &body(form())).await.unwrap_err();
        assert!(matches!(err, GenerationError::QuotaExhausted));
        assert_eq!(h.provider.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn own_key_bypasses_exhausted_quota() {
        let h = harness(Some(1));
        let headers = signed_in("u1");
        h.pipeline.generate(&headers, &body(form())).await.unwrap();

        let mut f = form();
        f["userAPIKey"] = json!("sk-mine");
        h.pipeline.generate(&headers, &body(f)).await.unwrap();

        let calls = h.provider.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].api_key_override.as_deref(), Some("sk-mine"));
        assert_eq!(h.identity.remaining("u1"), Some(RemainingQuota::OwnKey));
    }
}
