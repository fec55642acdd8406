use crate::gateway::geo::{geo_guard, GeoPolicy};
use crate::gateway::protocol::*;
use crate::gateway::server::GatewayState;
use crate::logo::{models, GenerationError, ModelEntry};
use crate::providers::GeneratedImage;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, HeaderValue},
    middleware,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

/// Build all routes for the gateway.
pub fn build_routes(state: GatewayState) -> Router {
    let cors = cors_layer(state.config.server.allowed_origins.as_deref());
    let geo = Arc::new(GeoPolicy::from_config(&state.config.geo));
    let body_limit = DefaultBodyLimit::max(state.config.server.max_body_bytes);

    Router::new()
        // Health
        .route("/api/health", get(health_handler))
        // Client bootstrap
        .route("/api/models", get(models_handler))
        .route("/api/feature-flags", get(feature_flags_handler))
        // Generation
        .route(
            "/api/generate-logo",
            post(generate_logo_handler).layer(body_limit),
        )
        .layer(middleware::from_fn_with_state(geo, geo_guard))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(allowed_origins: Option<&[String]>) -> CorsLayer {
    let origin = match allowed_origins {
        Some(origins) => AllowOrigin::list(
            origins
                .iter()
                .filter_map(|o| HeaderValue::from_str(o).ok()),
        ),
        None => AllowOrigin::any(),
    };
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

// ============================================================================
// Health
// ============================================================================

async fn health_handler(State(state): State<GatewayState>) -> Json<HealthResponse> {
    let uptime = state.start_time.elapsed().as_secs();
    Json(HealthResponse {
        status: "ok".to_string(),
        version: state.version.clone(),
        uptime,
        auth: state.pipeline.auth_enabled(),
        rate_limited: state.rate_limited,
    })
}

// ============================================================================
// Client Bootstrap
// ============================================================================

async fn models_handler() -> Json<&'static [ModelEntry]> {
    Json(models::all())
}

async fn feature_flags_handler(State(state): State<GatewayState>) -> Json<Vec<FeatureFlagInfo>> {
    Json(feature_flag_infos(&state.config.feature_flags))
}

// ============================================================================
// Generation
// ============================================================================

async fn generate_logo_handler(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<GeneratedImage>, GenerationError> {
    match state.pipeline.generate(&headers, &body).await {
        Ok(image) => Ok(Json(image)),
        Err(e) => {
            match &e {
                GenerationError::Unclassified(_) => {}
                GenerationError::MalformedRequest(detail) => {
                    debug!(kind = e.kind(), "Rejected logo request: {}", detail)
                }
                other => warn!(kind = other.kind(), "Logo generation failed: {}", other),
            }
            Err(e)
        }
    }
}
