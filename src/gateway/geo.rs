//! Country-based access policy.
//!
//! The edge network in front of the gateway tags each request with the
//! client's country. Requests from blocked countries are refused before any
//! other handling.

use crate::config::GeoConfig;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct GeoPolicy {
    header: String,
    blocked: HashSet<String>,
}

impl GeoPolicy {
    pub fn from_config(config: &GeoConfig) -> Self {
        Self {
            header: config.country_header.to_ascii_lowercase(),
            blocked: config
                .blocked_countries
                .iter()
                .map(|c| c.trim().to_ascii_uppercase())
                .collect(),
        }
    }

    /// Requests without the header are allowed.
    pub fn is_blocked(&self, headers: &HeaderMap) -> bool {
        headers
            .get(self.header.as_str())
            .and_then(|v| v.to_str().ok())
            .map(|country| self.blocked.contains(&country.trim().to_ascii_uppercase()))
            .unwrap_or(false)
    }
}

pub async fn geo_guard(
    State(policy): State<Arc<GeoPolicy>>,
    request: Request,
    next: Next,
) -> Response {
    if policy.is_blocked(request.headers()) {
        debug!(path = %request.uri().path(), "Refusing request from blocked country");
        return (StatusCode::FORBIDDEN, "Access Denied").into_response();
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn policy() -> GeoPolicy {
        GeoPolicy::from_config(&GeoConfig::default())
    }

    fn headers(country: &'static str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert("x-vercel-ip-country", HeaderValue::from_static(country));
        h
    }

    #[test]
    fn blocks_listed_country_case_insensitively() {
        assert!(policy().is_blocked(&headers("RU")));
        assert!(policy().is_blocked(&headers("ru")));
    }

    #[test]
    fn allows_other_countries_and_missing_header() {
        assert!(!policy().is_blocked(&headers("US")));
        assert!(!policy().is_blocked(&HeaderMap::new()));
    }

    #[test]
    fn custom_header_and_list() {
        let policy = GeoPolicy::from_config(&GeoConfig {
            country_header: "CF-IPCountry".to_string(),
            blocked_countries: vec!["kp".to_string()],
        });
        let mut h = HeaderMap::new();
        h.insert("cf-ipcountry", HeaderValue::from_static("KP"));
        assert!(policy.is_blocked(&h));
        assert!(!policy.is_blocked(&headers("RU")));
    }
}
