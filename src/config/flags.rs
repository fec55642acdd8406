//! Feature flags.
//!
//! Defaults are compiled in and can be overridden per deployment with
//! `FEATURE_FLAGS="AUTH=false,ANALYTICS=true"`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureFlag {
    Auth,
    CustomColorInput,
    DarkMode,
    Analytics,
}

impl FeatureFlag {
    pub const ALL: [FeatureFlag; 4] = [
        FeatureFlag::Auth,
        FeatureFlag::CustomColorInput,
        FeatureFlag::DarkMode,
        FeatureFlag::Analytics,
    ];

    pub fn key(self) -> &'static str {
        match self {
            FeatureFlag::Auth => "AUTH",
            FeatureFlag::CustomColorInput => "CUSTOM_COLOR_INPUT",
            FeatureFlag::DarkMode => "DARK_MODE",
            FeatureFlag::Analytics => "ANALYTICS",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            FeatureFlag::Auth => "Enables authentication features",
            FeatureFlag::CustomColorInput => "Enables custom color input",
            FeatureFlag::DarkMode => "Enables dark mode support",
            FeatureFlag::Analytics => "Enables analytics tracking",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct FeatureFlags {
    #[serde(default = "enabled")]
    pub auth: bool,
    #[serde(default)]
    pub custom_color_input: bool,
    #[serde(default)]
    pub dark_mode: bool,
    #[serde(default = "enabled")]
    pub analytics: bool,
}

fn enabled() -> bool {
    true
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            auth: true,
            custom_color_input: false,
            dark_mode: false,
            analytics: true,
        }
    }
}

impl FeatureFlags {
    pub fn is_enabled(&self, flag: FeatureFlag) -> bool {
        match flag {
            FeatureFlag::Auth => self.auth,
            FeatureFlag::CustomColorInput => self.custom_color_input,
            FeatureFlag::DarkMode => self.dark_mode,
            FeatureFlag::Analytics => self.analytics,
        }
    }

    pub fn set(&mut self, flag: FeatureFlag, value: bool) {
        match flag {
            FeatureFlag::Auth => self.auth = value,
            FeatureFlag::CustomColorInput => self.custom_color_input = value,
            FeatureFlag::DarkMode => self.dark_mode = value,
            FeatureFlag::Analytics => self.analytics = value,
        }
    }

    /// Apply `KEY=bool` overrides. Unknown keys are ignored.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, bool>) {
        for (key, value) in overrides {
            if let Some(flag) = FeatureFlag::from_key(key) {
                self.set(flag, *value);
            }
        }
    }
}

/// Parse a `FEATURE_FLAGS` value: comma-separated `KEY=value` pairs where a
/// value is true only if it reads `true` (any case). Pairs with an empty key
/// or value are skipped.
pub fn parse_feature_flag_env_var(value: &str) -> HashMap<String, bool> {
    value
        .split(',')
        .filter_map(|pair| {
            let mut parts = pair.split('=');
            let key = parts.next()?.trim();
            let value = parts.next()?.trim();
            if key.is_empty() || value.is_empty() {
                return None;
            }
            Some((key.to_string(), value.eq_ignore_ascii_case("true")))
        })
        .collect()
}
