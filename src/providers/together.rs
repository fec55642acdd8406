use super::errors::classify_response;
use super::*;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Route calls through the Helicone gateway for request logging.
#[derive(Debug, Clone)]
pub struct HeliconeOptions {
    pub api_key: String,
    pub base_url: String,
}

pub struct TogetherProvider {
    api_key: Option<String>,
    base_url: String,
    helicone: Option<HeliconeOptions>,
    client: Client,
}

impl TogetherProvider {
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        timeout: Duration,
        helicone: Option<HeliconeOptions>,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build Together HTTP client")?;
        Ok(Self {
            api_key,
            base_url,
            helicone,
            client,
        })
    }

    fn endpoint(&self) -> String {
        let base = match &self.helicone {
            Some(h) => h.base_url.as_str(),
            None => self.base_url.as_str(),
        };
        format!("{}/images/generations", base.trim_end_matches('/'))
    }
}

// ============================================================================
// Together API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct TogetherImageRequest<'a> {
    prompt: &'a str,
    model: &'a str,
    width: u32,
    height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    steps: Option<u32>,
    response_format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TogetherImageResponse {
    data: Vec<GeneratedImage>,
}

// ============================================================================
// ImageProvider Implementation
// ============================================================================

#[async_trait]
impl ImageProvider for TogetherProvider {
    async fn generate(&self, request: ImageRequest) -> Result<GeneratedImage, GenerationError> {
        let byok = request.api_key_override.is_some();
        let api_key = request
            .api_key_override
            .as_deref()
            .or(self.api_key.as_deref())
            .ok_or_else(|| anyhow::anyhow!("No Together API key configured"))?;

        let body = TogetherImageRequest {
            prompt: &request.prompt,
            model: &request.model,
            width: request.width,
            height: request.height,
            steps: request.steps,
            response_format: "base64",
            image_url: request
                .reference_image
                .as_ref()
                .map(|img| format!("data:image/png;base64,{img}")),
        };

        let mut req = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json");

        if let Some(helicone) = &self.helicone {
            req = req
                .header("Helicone-Auth", format!("Bearer {}", helicone.api_key))
                .header(
                    "Helicone-Property-LOGOBYOK",
                    if byok { "true" } else { "false" },
                );
        }

        debug!(model = %request.model, steps = ?request.steps, "Sending Together image request");

        let resp = req
            .json(&body)
            .send()
            .await
            .context("Together image request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(classify_response(status, &text));
        }

        let api_resp: TogetherImageResponse = resp
            .json()
            .await
            .context("Failed to decode Together image response")?;

        let image = api_resp
            .data
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("No images in Together response"))?;

        Ok(image)
    }

    fn name(&self) -> &str {
        "together"
    }
}
