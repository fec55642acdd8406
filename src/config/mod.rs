mod defaults;
mod flags;
mod io;
mod types;
mod validation;

pub use defaults::*;
pub use flags::*;
pub use io::*;
pub use types::*;
pub use validation::*;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

/// Top-level logocreator configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
    #[serde(default)]
    pub geo: GeoConfig,
    #[serde(default)]
    pub feature_flags: FeatureFlags,
}

impl Config {
    /// Load configuration from file, environment, and defaults.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config_path = path.map(PathBuf::from).or_else(find_config_file);

        let mut config = match config_path {
            Some(path) if path.exists() => {
                info!("Loading config from {}", path.display());
                load_config_file(&path)?
            }
            Some(path) => anyhow::bail!("Config file '{}' does not exist", path.display()),
            None => {
                info!("No config file found, using defaults");
                Config::default()
            }
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Write default configuration to a file.
    pub fn write_default(path: &str) -> Result<()> {
        let config = Config::default();
        let json = serde_json::to_string_pretty(&config)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Apply environment variable overrides. `lookup` is `std::env::var` in
    /// production.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("LOGOCREATOR_PORT").or_else(|| lookup("PORT")) {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!("Ignoring invalid port override: {}", port),
            }
        }

        if let Some(bind) = lookup("LOGOCREATOR_BIND") {
            match bind.parse() {
                Ok(mode) => self.server.bind = mode,
                Err(e) => warn!("Ignoring bind override: {}", e),
            }
        }

        if let Some(key) = lookup("TOGETHER_API_KEY") {
            self.provider.api_key = Some(key);
        }

        if let Some(url) = lookup("TOGETHER_BASE_URL") {
            self.provider.base_url = url;
        }

        if let Some(key) = lookup("HELICONE_API_KEY") {
            self.observability.helicone_api_key = Some(key);
        }

        // Upstash credentials switch rate limiting on.
        if let (Some(url), Some(token)) = (
            lookup("UPSTASH_REDIS_REST_URL"),
            lookup("UPSTASH_REDIS_REST_TOKEN"),
        ) {
            self.rate_limit.upstash_url = Some(url);
            self.rate_limit.upstash_token = Some(token);
            self.rate_limit.backend = RateLimitBackend::Upstash;
        }

        if let Some(backend) = lookup("LOGOCREATOR_RATE_LIMIT_BACKEND") {
            match backend.parse() {
                Ok(backend) => self.rate_limit.backend = backend,
                Err(e) => warn!("Ignoring rate limit backend override: {}", e),
            }
        }

        // Either Clerk key switches identity to Clerk; validation then
        // demands the other.
        if let Some(secret) = lookup("CLERK_SECRET_KEY") {
            self.auth.clerk_secret_key = Some(secret);
            self.auth.backend = IdentityBackend::Clerk;
        }

        if let Some(jwt_key) = lookup("CLERK_JWT_KEY") {
            self.auth.clerk_jwt_key = Some(jwt_key);
            self.auth.backend = IdentityBackend::Clerk;
        }

        if let Some(trust) = lookup("LOGOCREATOR_TRUST_USER_HEADER") {
            self.auth.trust_user_header = trust.eq_ignore_ascii_case("true");
        }

        if let Some(flags) = lookup("FEATURE_FLAGS") {
            self.feature_flags
                .apply_overrides(&parse_feature_flag_env_var(&flags));
        }

        if let Some(countries) = lookup("GEO_BLOCKED_COUNTRIES") {
            self.geo.blocked_countries = countries
                .split(',')
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect();
        }
    }

    /// Copy of the configuration with secrets masked, for display.
    pub fn redacted(&self) -> Self {
        fn mask(value: &mut Option<String>) {
            if value.is_some() {
                *value = Some("********".to_string());
            }
        }

        let mut config = self.clone();
        mask(&mut config.provider.api_key);
        mask(&mut config.rate_limit.upstash_token);
        mask(&mut config.auth.clerk_secret_key);
        mask(&mut config.observability.helicone_api_key);
        config
    }
}

/// Find the configuration file in standard locations.
fn find_config_file() -> Option<PathBuf> {
    let candidates = [
        PathBuf::from("logocreator.json"),
        PathBuf::from("logocreator.yaml"),
        PathBuf::from("logocreator.yml"),
        PathBuf::from("logocreator.toml"),
    ];

    for path in &candidates {
        if path.exists() {
            return Some(path.clone());
        }
    }

    // Check home directory
    if let Some(home) = dirs::home_dir() {
        let home_config = home.join(".logocreator").join("config.json");
        if home_config.exists() {
            return Some(home_config);
        }
    }

    None
}
