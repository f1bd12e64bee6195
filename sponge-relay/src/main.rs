//! sponge-relay - Contact import relay
//!
//! Forwards the browser's contact-import flow (start → progress → final) to
//! the upstream contact-aggregation API, attaching the server-held domain
//! credentials so the browser never sees them.

use anyhow::{Context, Result};
use clap::Parser;
use sponge_common::config::{load_toml_config, resolve_config_path, TomlConfig};
use sponge_common::Environment;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sponge_relay::config::{ConfigOverrides, RelayConfig, MODULE_NAME};
use sponge_relay::services::redact_url;
use sponge_relay::{build_router, AppState};

/// Command-line arguments for sponge-relay
#[derive(Parser, Debug)]
#[command(name = "sponge-relay")]
#[command(about = "Contact import relay for the CloudSponge API")]
#[command(version)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "SPONGE_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(short, long, env = "SPONGE_BIND")]
    bind: Option<SocketAddr>,

    /// Credential set to use (development or production)
    #[arg(short, long, env = "SPONGE_ENVIRONMENT")]
    environment: Option<Environment>,

    /// Upstream API base URL
    #[arg(long, env = "SPONGE_BASE_URL")]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load TOML before tracing init so its log level can seed the filter
    let config_path = resolve_config_path(args.config.as_deref(), MODULE_NAME);
    let loaded = match &config_path {
        Some(path) => load_toml_config(path)?,
        None => None,
    };
    let config_found = loaded.is_some();
    let toml_config = loaded.unwrap_or_default();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| toml_config.logging.level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting sponge-relay v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    match (&config_path, config_found) {
        (Some(path), true) => info!("Configuration: {}", path.display()),
        (Some(path), false) => warn!("Config file not found at {}, using defaults", path.display()),
        (None, _) => warn!("No config directory available, using defaults"),
    }

    let overrides = ConfigOverrides {
        bind: args.bind,
        environment: args.environment,
        base_url: args.base_url,
    };
    let config = resolve_config(&overrides, &toml_config)?;

    info!("Environment: {}", config.environment);
    info!("Upstream: {}", redact_url(&config.base_url));
    info!("Upstream timeout: {:?}", config.upstream_timeout);

    let state = AppState::from_config(&config).context("Failed to initialize relay")?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;
    info!("Listening on http://{}", config.bind);
    info!("Health check: http://{}/health", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Missing credentials stop startup here
fn resolve_config(overrides: &ConfigOverrides, toml_config: &TomlConfig) -> Result<RelayConfig> {
    RelayConfig::resolve(overrides, toml_config).context("Invalid configuration")
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
