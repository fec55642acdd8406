use super::defaults::*;
use serde::{Deserialize, Serialize};

// ============================================================================
// Server Configuration
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GatewayBindMode {
    #[default]
    Loopback,
    Lan,
    Custom,
}

impl std::str::FromStr for GatewayBindMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "loopback" => Ok(Self::Loopback),
            "lan" => Ok(Self::Lan),
            "custom" => Ok(Self::Custom),
            _ => Err(format!("invalid bind mode: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub bind: GatewayBindMode,
    pub custom_bind_host: Option<String>,
    /// CORS origins. `None` allows any origin.
    pub allowed_origins: Option<Vec<String>>,
    /// Request body cap for `/api/generate-logo`. Reference images arrive
    /// inline as base64.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: GatewayBindMode::default(),
            custom_bind_host: None,
            allowed_origins: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

// ============================================================================
// Image Provider
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    #[serde(default = "default_together_base_url")]
    pub base_url: String,
    /// Server-side Together key used when the caller does not bring one.
    pub api_key: Option<String>,
    #[serde(default = "default_image_size")]
    pub width: u32,
    #[serde(default = "default_image_size")]
    pub height: u32,
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_TOGETHER_BASE_URL.to_string(),
            api_key: None,
            width: DEFAULT_IMAGE_SIZE,
            height: DEFAULT_IMAGE_SIZE,
            timeout_secs: DEFAULT_PROVIDER_TIMEOUT_SECS,
        }
    }
}

// ============================================================================
// Rate Limiting
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RateLimitBackend {
    #[default]
    Disabled,
    Memory,
    Upstash,
}

impl std::str::FromStr for RateLimitBackend {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "disabled" | "off" => Ok(Self::Disabled),
            "memory" => Ok(Self::Memory),
            "upstash" => Ok(Self::Upstash),
            _ => Err(format!("invalid rate limit backend: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitConfig {
    #[serde(default)]
    pub backend: RateLimitBackend,
    /// Generations allowed per identity per window.
    #[serde(default = "default_rate_limit")]
    pub limit: u32,
    #[serde(default = "default_rate_window")]
    pub window_secs: u64,
    #[serde(default = "default_rate_prefix")]
    pub prefix: String,
    pub upstash_url: Option<String>,
    pub upstash_token: Option<String>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            backend: RateLimitBackend::default(),
            limit: DEFAULT_RATE_LIMIT,
            window_secs: DEFAULT_RATE_WINDOW_SECS,
            prefix: DEFAULT_RATE_PREFIX.to_string(),
            upstash_url: None,
            upstash_token: None,
        }
    }
}

// ============================================================================
// Identity
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IdentityBackend {
    /// Trust a header set by an authenticating proxy.
    #[default]
    Header,
    Clerk,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthConfig {
    #[serde(default)]
    pub backend: IdentityBackend,
    #[serde(default = "default_user_header")]
    pub user_header: String,
    /// Permit credit gating keyed on the trusted header. Only safe behind a
    /// proxy that sets the header itself.
    #[serde(default)]
    pub trust_user_header: bool,
    pub clerk_jwt_key: Option<String>,
    pub clerk_secret_key: Option<String>,
    #[serde(default = "default_clerk_api_url")]
    pub clerk_api_url: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            backend: IdentityBackend::default(),
            user_header: DEFAULT_USER_HEADER.to_string(),
            trust_user_header: false,
            clerk_jwt_key: None,
            clerk_secret_key: None,
            clerk_api_url: DEFAULT_CLERK_API_URL.to_string(),
        }
    }
}

// ============================================================================
// Observability
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservabilityConfig {
    pub helicone_api_key: Option<String>,
    #[serde(default = "default_helicone_base_url")]
    pub helicone_base_url: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            helicone_api_key: None,
            helicone_base_url: DEFAULT_HELICONE_BASE_URL.to_string(),
        }
    }
}

// ============================================================================
// Geo Policy
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoConfig {
    #[serde(default = "default_country_header")]
    pub country_header: String,
    /// ISO 3166-1 alpha-2 codes, matched case-insensitively.
    #[serde(default = "default_blocked_countries")]
    pub blocked_countries: Vec<String>,
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            country_header: DEFAULT_COUNTRY_HEADER.to_string(),
            blocked_countries: default_blocked_countries(),
        }
    }
}

// ============================================================================
// Serde default helpers
// ============================================================================

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

fn default_together_base_url() -> String {
    DEFAULT_TOGETHER_BASE_URL.to_string()
}

fn default_image_size() -> u32 {
    DEFAULT_IMAGE_SIZE
}

fn default_provider_timeout() -> u64 {
    DEFAULT_PROVIDER_TIMEOUT_SECS
}

fn default_rate_limit() -> u32 {
    DEFAULT_RATE_LIMIT
}

fn default_rate_window() -> u64 {
    DEFAULT_RATE_WINDOW_SECS
}

fn default_rate_prefix() -> String {
    DEFAULT_RATE_PREFIX.to_string()
}

fn default_user_header() -> String {
    DEFAULT_USER_HEADER.to_string()
}

fn default_clerk_api_url() -> String {
    DEFAULT_CLERK_API_URL.to_string()
}

fn default_helicone_base_url() -> String {
    DEFAULT_HELICONE_BASE_URL.to_string()
}

fn default_country_header() -> String {
    DEFAULT_COUNTRY_HEADER.to_string()
}

fn default_blocked_countries() -> Vec<String> {
    DEFAULT_BLOCKED_COUNTRIES
        .iter()
        .map(|c| c.to_string())
        .collect()
}
