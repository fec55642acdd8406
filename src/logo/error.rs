use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

/// Every way a logo generation request can fail.
///
/// All variants except [`GenerationError::Unclassified`] are terminal and
/// carry a message meant for the end user. Nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Invalid model selected")]
    UnknownModel(String),

    #[error("This model requires a reference image")]
    MissingReferenceImage(String),

    #[error("Not signed in")]
    Unauthenticated,

    #[error("You've used up all your credits. Enter your own Together API Key to generate more logos.")]
    QuotaExhausted,

    #[error("Your API key is invalid.")]
    InvalidCredential,

    #[error("Your Together AI account needs to be in Build Tier 2 ($50 credit pack purchase required) to use this model. Please make a purchase at: https://api.together.xyz/settings/billing")]
    TierUpgradeRequired,

    #[error("Your prompt may contain sensitive content. Please modify your company name or additional information to be more business-appropriate and try again.")]
    ContentPolicyViolation,

    #[error(transparent)]
    Unclassified(#[from] anyhow::Error),
}

impl GenerationError {
    pub fn status(&self) -> StatusCode {
        match self {
            GenerationError::MalformedRequest(_)
            | GenerationError::UnknownModel(_)
            | GenerationError::MissingReferenceImage(_) => StatusCode::BAD_REQUEST,
            GenerationError::Unauthenticated => StatusCode::NOT_FOUND,
            GenerationError::QuotaExhausted => StatusCode::TOO_MANY_REQUESTS,
            GenerationError::InvalidCredential => StatusCode::UNAUTHORIZED,
            GenerationError::TierUpgradeRequired => StatusCode::FORBIDDEN,
            GenerationError::ContentPolicyViolation => StatusCode::UNPROCESSABLE_ENTITY,
            GenerationError::Unclassified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short machine-readable name, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::MalformedRequest(_) => "malformed_request",
            GenerationError::UnknownModel(_) => "unknown_model",
            GenerationError::MissingReferenceImage(_) => "missing_reference_image",
            GenerationError::Unauthenticated => "unauthenticated",
            GenerationError::QuotaExhausted => "quota_exhausted",
            GenerationError::InvalidCredential => "invalid_credential",
            GenerationError::TierUpgradeRequired => "tier_upgrade_required",
            GenerationError::ContentPolicyViolation => "content_policy_violation",
            GenerationError::Unclassified(_) => "unclassified",
        }
    }
}

impl IntoResponse for GenerationError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            GenerationError::Unauthenticated => String::new(),
            GenerationError::Unclassified(e) => {
                error!("Unclassified generation failure: {:#}", e);
                "Failed to generate logo".to_string()
            }
            other => other.to_string(),
        };
        (status, [(axum::http::header::CONTENT_TYPE, "text/plain")], body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, GenerationError>;
