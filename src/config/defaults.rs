/// Default configuration constants used across the system.

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 3000;

/// Body cap for generation requests (10 MB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Together AI REST base URL.
pub const DEFAULT_TOGETHER_BASE_URL: &str = "https://api.together.xyz/v1";

/// Helicone's Together proxy.
pub const DEFAULT_HELICONE_BASE_URL: &str = "https://together.helicone.ai/v1";

/// Generated logos are square.
pub const DEFAULT_IMAGE_SIZE: u32 = 768;

/// Provider request timeout. Image models can take a while.
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 120;

/// Free generations per identity per window.
pub const DEFAULT_RATE_LIMIT: u32 = 3;

/// Rate limit window (60 days).
pub const DEFAULT_RATE_WINDOW_SECS: u64 = 60 * 24 * 60 * 60;

/// Key prefix for rate limit counters.
pub const DEFAULT_RATE_PREFIX: &str = "logocreator";

/// Header carrying the user id for the header identity backend.
pub const DEFAULT_USER_HEADER: &str = "x-user-id";

/// Clerk backend API.
pub const DEFAULT_CLERK_API_URL: &str = "https://api.clerk.com";

/// Header the edge network sets with the client's country.
pub const DEFAULT_COUNTRY_HEADER: &str = "x-vercel-ip-country";

pub const DEFAULT_BLOCKED_COUNTRIES: &[&str] = &["RU"];
