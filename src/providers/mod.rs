pub mod errors;
mod together;

pub use together::{HeliconeOptions, TogetherProvider};

use crate::config::Config;
use crate::logo::GenerationError;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ============================================================================
// Provider Types
// ============================================================================

/// One outbound image generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    pub prompt: String,
    pub model: String,
    pub width: u32,
    pub height: u32,
    pub steps: Option<u32>,
    /// Raw base64 payload; the provider wraps it in a data URL.
    pub reference_image: Option<String>,
    /// Caller-supplied key. Takes precedence over the server key.
    pub api_key_override: Option<String>,
}

/// The image returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub b64_json: String,
    #[serde(default)]
    pub index: u32,
}

// ============================================================================
// Provider Trait
// ============================================================================

#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Issue exactly one generation request. Failures are classified; there
    /// are no retries.
    async fn generate(&self, request: ImageRequest) -> Result<GeneratedImage, GenerationError>;
    fn name(&self) -> &str;
}

// ============================================================================
// Provider Resolution
// ============================================================================

pub fn resolve_provider(config: &Config) -> anyhow::Result<TogetherProvider> {
    let helicone = config
        .observability
        .helicone_api_key
        .clone()
        .map(|api_key| HeliconeOptions {
            api_key,
            base_url: config.observability.helicone_base_url.clone(),
        });

    TogetherProvider::new(
        config.provider.base_url.clone(),
        config.provider.api_key.clone(),
        std::time::Duration::from_secs(config.provider.timeout_secs),
        helicone,
    )
}
