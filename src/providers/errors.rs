//! Provider error-document classification.
//!
//! Together reports failures as `{"error": {"message", "type", "code"}}`.
//! The shapes overlap (a blocked request also has a message and a type), so
//! the rules are checked in a fixed order and the first match wins.

use crate::logo::GenerationError;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::warn;

/// Provider failures the user can act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    InvalidCredential,
    TierUpgradeRequired,
    ContentPolicyViolation,
}

impl From<ProviderErrorKind> for GenerationError {
    fn from(kind: ProviderErrorKind) -> Self {
        match kind {
            ProviderErrorKind::InvalidCredential => GenerationError::InvalidCredential,
            ProviderErrorKind::TierUpgradeRequired => GenerationError::TierUpgradeRequired,
            ProviderErrorKind::ContentPolicyViolation => GenerationError::ContentPolicyViolation,
        }
    }
}

type Rule = (fn(&Value) -> bool, ProviderErrorKind);

/// Classification rules in priority order.
const RULES: &[Rule] = &[
    (is_invalid_api_key, ProviderErrorKind::InvalidCredential),
    (is_request_blocked, ProviderErrorKind::TierUpgradeRequired),
    (is_nsfw_rejection, ProviderErrorKind::ContentPolicyViolation),
];

fn detail(doc: &Value) -> Option<&Value> {
    doc.get("error").filter(|e| e.is_object())
}

fn is_invalid_api_key(doc: &Value) -> bool {
    detail(doc)
        .and_then(|e| e.get("code"))
        .and_then(Value::as_str)
        == Some("invalid_api_key")
}

fn is_request_blocked(doc: &Value) -> bool {
    detail(doc)
        .and_then(|e| e.get("type"))
        .and_then(Value::as_str)
        == Some("request_blocked")
}

fn is_nsfw_rejection(doc: &Value) -> bool {
    let Some(err) = detail(doc) else {
        return false;
    };
    let message = err.get("message").and_then(Value::as_str);
    let has_type = err.get("type").and_then(Value::as_str).is_some();
    matches!(message, Some(m) if has_type && m.contains("NSFW content"))
}

/// Match a parsed error document against the rules.
pub fn classify_document(doc: &Value) -> Option<ProviderErrorKind> {
    RULES
        .iter()
        .find(|(matches, _)| matches(doc))
        .map(|(_, kind)| *kind)
}

/// Turn a failed provider response into a [`GenerationError`].
///
/// Bodies that are not JSON or match no rule become
/// [`GenerationError::Unclassified`] carrying the status and raw body.
pub fn classify_response(status: StatusCode, body: &str) -> GenerationError {
    let kind = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|doc| classify_document(&doc));

    match kind {
        Some(kind) => {
            warn!(?kind, %status, "Provider rejected generation request");
            kind.into()
        }
        None => GenerationError::Unclassified(anyhow::anyhow!(
            "Together API error ({}): {}",
            status,
            body
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn invalid_api_key() {
        let doc = json!({"error": {"message": "Invalid API key provided", "type": "invalid_request_error", "code": "invalid_api_key"}});
        assert_eq!(
            classify_document(&doc),
            Some(ProviderErrorKind::InvalidCredential)
        );
    }

    #[test]
    fn request_blocked() {
        let doc = json!({"error": {"message": "Upgrade to Build Tier 2", "type": "request_blocked"}});
        assert_eq!(
            classify_document(&doc),
            Some(ProviderErrorKind::TierUpgradeRequired)
        );
    }

    #[test]
    fn nsfw() {
        let doc = json!({"error": {"message": "Image generation failed: NSFW content detected", "type": "invalid_request_error"}});
        assert_eq!(
            classify_document(&doc),
            Some(ProviderErrorKind::ContentPolicyViolation)
        );
    }

    #[test]
    fn nsfw_requires_type() {
        let doc = json!({"error": {"message": "NSFW content detected"}});
        assert_eq!(classify_document(&doc), None);
    }

    #[test]
    fn credential_wins_over_blocked() {
        let doc = json!({"error": {"code": "invalid_api_key", "type": "request_blocked", "message": "NSFW content"}});
        assert_eq!(
            classify_document(&doc),
            Some(ProviderErrorKind::InvalidCredential)
        );
    }

    #[test]
    fn blocked_wins_over_nsfw() {
        let doc = json!({"error": {"type": "request_blocked", "message": "NSFW content"}});
        assert_eq!(
            classify_document(&doc),
            Some(ProviderErrorKind::TierUpgradeRequired)
        );
    }

    #[test]
    fn unrelated_error_is_unclassified() {
        let err = classify_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error": {"message": "model overloaded", "type": "server_error"}}"#,
        );
        assert!(matches!(err, GenerationError::Unclassified(_)));
        assert!(err.to_string().contains("model overloaded"));
    }

    #[test]
    fn non_json_body_is_unclassified() {
        let err = classify_response(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert!(matches!(err, GenerationError::Unclassified(_)));
    }

    #[test]
    fn string_error_field_is_unclassified() {
        let doc = json!({"error": "invalid_api_key"});
        assert_eq!(classify_document(&doc), None);
    }
}
