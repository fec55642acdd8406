use super::error::{GenerationError, Result};
use super::models::{self, ModelEntry, DEFAULT_MODEL_ID};
use super::prompt::Style;
use super::sanitize::sanitize;

use base64::Engine;
use serde::Deserialize;
use tracing::debug;

/// The JSON body posted by the logo form, before any checks.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawGenerationRequest {
    #[serde(rename = "userAPIKey")]
    pub user_api_key: Option<String>,
    pub company_name: String,
    pub selected_style: String,
    pub selected_model: Option<String>,
    pub selected_primary_color: String,
    pub selected_background_color: String,
    pub additional_info: Option<String>,
    pub reference_image: Option<String>,
}

/// A request that passed validation and is ready for prompt composition.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Caller-supplied provider key (bring-your-own-key). Bypasses quotas.
    pub api_key_override: Option<String>,
    pub company_name: String,
    pub style: Style,
    pub model: &'static ModelEntry,
    pub primary_color: String,
    pub background_color: String,
    /// Sanitized; empty when the caller sent nothing.
    pub additional_info: String,
    /// Base64 image payload without a data URL prefix.
    pub reference_image: Option<String>,
}

impl GenerationRequest {
    /// Parse and validate a raw request body.
    pub fn from_json(body: &[u8]) -> Result<Self> {
        let raw: RawGenerationRequest = serde_json::from_slice(body)
            .map_err(|e| GenerationError::MalformedRequest(e.to_string()))?;
        validate(raw)
    }

    pub fn is_byok(&self) -> bool {
        self.api_key_override.is_some()
    }
}

/// Validate a parsed request.
///
/// Checks run in a fixed order: shape, sanitization, model lookup, reference
/// image requirement. The first failure wins.
pub fn validate(raw: RawGenerationRequest) -> Result<GenerationRequest> {
    let style: Style = raw
        .selected_style
        .parse()
        .map_err(GenerationError::MalformedRequest)?;

    if let Some(image) = raw.reference_image.as_deref().filter(|s| !s.is_empty()) {
        base64::engine::general_purpose::STANDARD
            .decode(image)
            .map_err(|e| {
                GenerationError::MalformedRequest(format!("referenceImage is not valid base64: {e}"))
            })?;
    }

    let company_name = sanitize(&raw.company_name);
    if company_name.is_empty() {
        return Err(GenerationError::MalformedRequest(
            "companyName is empty after sanitization".to_string(),
        ));
    }
    let additional_info = raw
        .additional_info
        .as_deref()
        .map(sanitize)
        .unwrap_or_default();

    let model_id = raw.selected_model.as_deref().unwrap_or(DEFAULT_MODEL_ID);
    let model = models::lookup(model_id)
        .ok_or_else(|| GenerationError::UnknownModel(model_id.to_string()))?;

    let reference_image = raw.reference_image.filter(|s| !s.is_empty());
    if model.requires_reference_image && reference_image.is_none() {
        return Err(GenerationError::MissingReferenceImage(model_id.to_string()));
    }

    let api_key_override = raw.user_api_key.filter(|k| !k.trim().is_empty());

    debug!(
        model = model.model_id,
        style = %style,
        byok = api_key_override.is_some(),
        "Validated generation request"
    );

    Ok(GenerationRequest {
        api_key_override,
        company_name,
        style,
        model,
        primary_color: raw.selected_primary_color,
        background_color: raw.selected_background_color,
        additional_info,
        reference_image,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    fn valid() -> serde_json::Value {
        json!({
            "companyName": "Sam's Burgers!!",
            "selectedStyle": "Minimal",
            "selectedModel": "black-forest-labs/FLUX.1-dev",
            "selectedPrimaryColor": "#112233",
            "selectedBackgroundColor": "White",
        })
    }

    #[test]
    fn sanitizes_company_name() {
        let req = GenerationRequest::from_json(&body(valid())).unwrap();
        assert_eq!(req.company_name, "Sams Burgers");
        assert_eq!(req.style, Style::Minimal);
        assert_eq!(req.model.model_id, "black-forest-labs/FLUX.1-dev");
        assert_eq!(req.additional_info, "");
        assert!(!req.is_byok());
    }

    #[test]
    fn sanitizes_additional_info() {
        let mut v = valid();
        v["additionalInfo"] = json!("  use a <b>burger</b>!  ");
        let req = GenerationRequest::from_json(&body(v)).unwrap();
        assert_eq!(req.additional_info, "use a bburgerb");
    }

    #[test]
    fn missing_model_uses_default() {
        let mut v = valid();
        v.as_object_mut().unwrap().remove("selectedModel");
        let req = GenerationRequest::from_json(&body(v)).unwrap();
        assert_eq!(req.model.model_id, DEFAULT_MODEL_ID);
    }

    #[test]
    fn invalid_json_is_malformed() {
        let err = GenerationRequest::from_json(b"{not json").unwrap_err();
        assert!(matches!(err, GenerationError::MalformedRequest(_)));
    }

    #[test]
    fn missing_required_field_is_malformed() {
        let mut v = valid();
        v.as_object_mut().unwrap().remove("selectedPrimaryColor");
        let err = GenerationRequest::from_json(&body(v)).unwrap_err();
        assert!(matches!(err, GenerationError::MalformedRequest(_)));
    }

    #[test]
    fn wrong_type_is_malformed() {
        let mut v = valid();
        v["companyName"] = json!(42);
        let err = GenerationRequest::from_json(&body(v)).unwrap_err();
        assert!(matches!(err, GenerationError::MalformedRequest(_)));
    }

    #[test]
    fn unknown_style_is_malformed() {
        let mut v = valid();
        v["selectedStyle"] = json!("Retro");
        let err = GenerationRequest::from_json(&body(v)).unwrap_err();
        assert!(matches!(err, GenerationError::MalformedRequest(_)));
    }

    #[test]
    fn company_name_of_only_symbols_is_malformed() {
        let mut v = valid();
        v["companyName"] = json!("!!!");
        let err = GenerationRequest::from_json(&body(v)).unwrap_err();
        assert!(matches!(err, GenerationError::MalformedRequest(_)));
    }

    #[test]
    fn unknown_model() {
        let mut v = valid();
        v["selectedModel"] = json!("openai/dall-e-3");
        let err = GenerationRequest::from_json(&body(v)).unwrap_err();
        assert!(matches!(err, GenerationError::UnknownModel(ref id) if id == "openai/dall-e-3"));
    }

    #[test]
    fn canny_without_reference_image() {
        let mut v = valid();
        v["selectedModel"] = json!("black-forest-labs/FLUX.1-canny");
        let err = GenerationRequest::from_json(&body(v)).unwrap_err();
        assert!(matches!(err, GenerationError::MissingReferenceImage(_)));
    }

    #[test]
    fn canny_with_empty_reference_image() {
        let mut v = valid();
        v["selectedModel"] = json!("black-forest-labs/FLUX.1-depth");
        v["referenceImage"] = json!("");
        let err = GenerationRequest::from_json(&body(v)).unwrap_err();
        assert!(matches!(err, GenerationError::MissingReferenceImage(_)));
    }

    #[test]
    fn canny_with_reference_image() {
        let mut v = valid();
        v["selectedModel"] = json!("black-forest-labs/FLUX.1-canny");
        v["referenceImage"] = json!("aGVsbG8=");
        let req = GenerationRequest::from_json(&body(v)).unwrap();
        assert_eq!(req.reference_image.as_deref(), Some("aGVsbG8="));
    }

    #[test]
    fn reference_image_must_be_base64() {
        let mut v = valid();
        v["referenceImage"] = json!("not base64!");
        let err = GenerationRequest::from_json(&body(v)).unwrap_err();
        assert!(matches!(err, GenerationError::MalformedRequest(_)));
    }

    #[test]
    fn unknown_model_checked_before_reference_image() {
        let mut v = valid();
        v["selectedModel"] = json!("nope/none");
        let err = GenerationRequest::from_json(&body(v)).unwrap_err();
        assert!(matches!(err, GenerationError::UnknownModel(_)));
    }

    #[test]
    fn byok_key_is_kept_and_blank_key_ignored() {
        let mut v = valid();
        v["userAPIKey"] = json!("sk-user");
        let req = GenerationRequest::from_json(&body(v.clone())).unwrap();
        assert_eq!(req.api_key_override.as_deref(), Some("sk-user"));

        v["userAPIKey"] = json!("   ");
        let req = GenerationRequest::from_json(&body(v)).unwrap();
        assert!(!req.is_byok());
    }
}
