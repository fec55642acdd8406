use super::{Config, GatewayBindMode, IdentityBackend, RateLimitBackend};
use anyhow::Result;
use tracing::warn;

/// Validation errors for configuration.
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

fn error(path: &str, message: &str) -> ConfigValidationError {
    ConfigValidationError {
        path: path.to_string(),
        message: message.to_string(),
    }
}

/// Validate a configuration object.
pub fn validate_config(config: &Config) -> Vec<ConfigValidationError> {
    let mut errors = Vec::new();

    if config.server.port == 0 {
        errors.push(error("server.port", "Port must be greater than 0"));
    }

    if config.server.bind == GatewayBindMode::Custom && config.server.custom_bind_host.is_none() {
        errors.push(error(
            "server.customBindHost",
            "Custom bind mode requires a host",
        ));
    }

    if config.provider.base_url.is_empty() {
        errors.push(error("provider.baseUrl", "Provider base URL is required"));
    }

    if config.provider.width == 0 || config.provider.height == 0 {
        errors.push(error("provider", "Image dimensions must be greater than 0"));
    }

    if config.provider.api_key.is_none() {
        warn!("No TOGETHER_API_KEY configured; only requests with their own key will succeed");
    }

    let rate = &config.rate_limit;
    if rate.backend != RateLimitBackend::Disabled {
        if rate.limit == 0 {
            errors.push(error("rateLimit.limit", "Limit must be greater than 0"));
        }
        if rate.window_secs == 0 {
            errors.push(error("rateLimit.windowSecs", "Window must be greater than 0"));
        }
    }

    if rate.backend == RateLimitBackend::Upstash
        && (rate.upstash_url.is_none() || rate.upstash_token.is_none())
    {
        errors.push(error(
            "rateLimit.upstashUrl",
            "Upstash backend requires UPSTASH_REDIS_REST_URL and UPSTASH_REDIS_REST_TOKEN",
        ));
    }

    if config.auth.backend == IdentityBackend::Clerk {
        if config.auth.clerk_secret_key.is_none() {
            errors.push(error(
                "auth.clerkSecretKey",
                "Clerk identity requires CLERK_SECRET_KEY",
            ));
        }
        if config.auth.clerk_jwt_key.is_none() {
            errors.push(error("auth.clerkJwtKey", "Clerk identity requires CLERK_JWT_KEY"));
        }
    }

    if gates_on_untrusted_header(config) {
        errors.push(error(
            "auth.trustUserHeader",
            "Credit limits keyed on a client-supplied user header can be bypassed; \
             configure Clerk or set trustUserHeader behind an authenticating proxy",
        ));
    }

    if config.server.max_body_bytes == 0 {
        errors.push(error(
            "server.maxBodyBytes",
            "Body limit must be greater than 0",
        ));
    }

    if !config.feature_flags.auth && rate.backend != RateLimitBackend::Disabled {
        warn!("Rate limiting is configured but AUTH is disabled; quotas will not be enforced");
    }

    errors
}

/// Quotas would be enforced against an identity the client chooses freely.
pub fn gates_on_untrusted_header(config: &Config) -> bool {
    config.feature_flags.auth
        && config.rate_limit.backend != RateLimitBackend::Disabled
        && config.auth.backend == IdentityBackend::Header
        && !config.auth.trust_user_header
}

/// Validate configuration and return Result.
pub fn validate_config_object(config: &Config) -> Result<()> {
    let errors = validate_config(config);
    if errors.is_empty() {
        Ok(())
    } else {
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        anyhow::bail!("Configuration validation failed:\n{}", messages.join("\n"));
    }
}
