use crate::auth::resolve_identity_provider;
use crate::cli::ServeOpts;
use crate::config::{gates_on_untrusted_header, Config, GatewayBindMode};
use crate::gateway::routes;
use crate::logo::{ImageSize, LogoPipeline};
use crate::providers::resolve_provider;
use crate::ratelimit::{resolve_rate_limiter, CreditGate};

use anyhow::{Context, Result};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::broadcast;
use tracing::info;

/// Shared state for the gateway server.
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<Config>,
    pub pipeline: LogoPipeline,
    pub rate_limited: bool,
    pub start_time: std::time::Instant,
    pub version: String,
}

impl GatewayState {
    /// Wire the pipeline collaborators from configuration.
    ///
    /// Identity is only resolved when the `AUTH` flag is on. Without it every
    /// request is anonymous and the credit gate never engages.
    pub fn from_config(config: Config) -> Result<Self> {
        if gates_on_untrusted_header(&config) {
            anyhow::bail!(
                "Refusing to enforce credit limits on the client-supplied {} header; \
                 configure Clerk or set auth.trustUserHeader",
                config.auth.user_header
            );
        }

        let provider = Arc::new(resolve_provider(&config)?);

        let identity = if config.feature_flags.auth {
            let identity = resolve_identity_provider(&config.auth)?;
            info!("Identity provider: {}", identity.name());
            Some(identity)
        } else {
            None
        };

        let limiter = resolve_rate_limiter(&config.rate_limit)?;
        if let Some(limiter) = &limiter {
            info!(
                limit = config.rate_limit.limit,
                window_secs = config.rate_limit.window_secs,
                "Rate limiter: {}",
                limiter.name()
            );
        }

        let gate = CreditGate::new(limiter, identity.clone());
        let rate_limited = identity.is_some() && gate.is_limited();
        let size = ImageSize {
            width: config.provider.width,
            height: config.provider.height,
        };

        Ok(Self {
            pipeline: LogoPipeline::new(provider, identity, gate, size),
            config: Arc::new(config),
            rate_limited,
            start_time: std::time::Instant::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }
}

/// The gateway server.
pub struct GatewayServer {
    state: GatewayState,
    addr: SocketAddr,
    shutdown_tx: broadcast::Sender<()>,
}

impl GatewayServer {
    /// Start the gateway server with the given configuration.
    pub async fn start(config: Config, opts: ServeOpts) -> Result<Self> {
        let port = opts.port.unwrap_or(config.server.port);
        let addr = resolve_bind_address(&config, opts.bind.as_deref(), port)?;

        let state = GatewayState::from_config(config)?;
        let (shutdown_tx, _) = broadcast::channel(1);

        info!("Gateway server binding to {}", addr);

        Ok(Self {
            state,
            addr,
            shutdown_tx,
        })
    }

    /// Run the server until shutdown signal is received.
    pub async fn run_until_shutdown(self) -> Result<()> {
        let app = build_router(self.state.clone());

        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .with_context(|| format!("failed to bind {}", self.addr))?;
        info!(
            "logocreator gateway v{} listening on {}",
            self.state.version, self.addr
        );

        print_startup_banner(&self.state, &self.addr);

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let external = async move {
            let _ = shutdown_rx.recv().await;
        };

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown_signal() => {}
                    _ = external => info!("Shutdown requested"),
                }
            })
            .await?;

        info!("Gateway server shut down gracefully");
        Ok(())
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Handle that triggers graceful shutdown when sent to.
    pub fn shutdown_handle(&self) -> broadcast::Sender<()> {
        self.shutdown_tx.clone()
    }
}

/// Build the Axum router with all routes.
fn build_router(state: GatewayState) -> Router {
    routes::build_routes(state)
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown");
        }
    }
}

/// Resolve the bind address from configuration and the CLI override.
fn resolve_bind_address(config: &Config, bind_override: Option<&str>, port: u16) -> Result<SocketAddr> {
    let bind = match bind_override {
        Some(b) => b.parse::<GatewayBindMode>().map_err(anyhow::Error::msg)?,
        None => config.server.bind,
    };

    let host = match bind {
        GatewayBindMode::Loopback => "127.0.0.1",
        GatewayBindMode::Lan => "0.0.0.0",
        GatewayBindMode::Custom => config
            .server
            .custom_bind_host
            .as_deref()
            .unwrap_or("0.0.0.0"),
    };

    format!("{host}:{port}")
        .parse()
        .with_context(|| format!("invalid bind address {host}:{port}"))
}

fn print_startup_banner(state: &GatewayState, addr: &SocketAddr) {
    let auth = if state.pipeline.auth_enabled() {
        "enabled"
    } else {
        "disabled"
    };
    let limits = if state.rate_limited {
        format!(
            "{} per {}s",
            state.config.rate_limit.limit, state.config.rate_limit.window_secs
        )
    } else {
        "off".to_string()
    };

    info!("-------------------------------------------");
    info!("  logocreator v{}", state.version);
    info!("  Listening on: http://{}", addr);
    info!("  Auth: {}", auth);
    info!("  Credit limit: {}", limits);
    info!("  Generate: POST http://{}/api/generate-logo", addr);
    info!("  Health: http://{}/api/health", addr);
    info!("-------------------------------------------");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RateLimitBackend;

    #[test]
    fn bind_modes_resolve_hosts() {
        let mut config = Config::default();
        assert_eq!(
            resolve_bind_address(&config, None, 3000).unwrap(),
            "127.0.0.1:3000".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(
            resolve_bind_address(&config, Some("lan"), 8080).unwrap(),
            "0.0.0.0:8080".parse::<SocketAddr>().unwrap()
        );

        config.server.bind = GatewayBindMode::Custom;
        config.server.custom_bind_host = Some("10.0.0.5".to_string());
        assert_eq!(
            resolve_bind_address(&config, None, 3000).unwrap(),
            "10.0.0.5:3000".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn bad_bind_override_is_an_error() {
        assert!(resolve_bind_address(&Config::default(), Some("everywhere"), 3000).is_err());
    }

    #[test]
    fn state_without_auth_is_not_rate_limited() {
        let mut config = Config::default();
        config.feature_flags.auth = false;
        config.rate_limit.backend = RateLimitBackend::Memory;
        let state = GatewayState::from_config(config).unwrap();
        assert!(!state.pipeline.auth_enabled());
        assert!(!state.rate_limited);
    }

    #[test]
    fn state_with_auth_and_limiter_is_rate_limited() {
        let mut config = Config::default();
        config.auth.trust_user_header = true;
        config.rate_limit.backend = RateLimitBackend::Memory;
        let state = GatewayState::from_config(config).unwrap();
        assert!(state.pipeline.auth_enabled());
        assert!(state.rate_limited);
    }

    #[test]
    fn limiter_on_untrusted_header_refused() {
        let mut config = Config::default();
        config.rate_limit.backend = RateLimitBackend::Memory;
        let err = GatewayState::from_config(config).err().unwrap();
        assert!(err.to_string().contains("x-user-id"));
    }
}
