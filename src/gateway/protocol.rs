use crate::config::{FeatureFlag, FeatureFlags};
use serde::Serialize;

/// Response of `GET /api/health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime: u64,
    pub auth: bool,
    pub rate_limited: bool,
}

/// One entry of `GET /api/feature-flags`.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureFlagInfo {
    pub name: &'static str,
    pub enabled: bool,
    pub description: &'static str,
}

/// Flags keyed by name, in the shape the web client's flag context reads.
pub fn feature_flag_infos(flags: &FeatureFlags) -> Vec<FeatureFlagInfo> {
    FeatureFlag::ALL
        .into_iter()
        .map(|flag| FeatureFlagInfo {
            name: flag.key(),
            enabled: flags.is_enabled(flag),
            description: flag.description(),
        })
        .collect()
}
