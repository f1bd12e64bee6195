//! sponge-relay library interface
//!
//! Exposes the relay, its HTTP router, and configuration for the binary and
//! for integration testing.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sponge_common::Environment;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::RelayConfig;
use crate::services::{ImportRelay, ReqwestTransport, UrlBuilder};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Upstream relay (credentials + transport)
    pub relay: Arc<ImportRelay>,
    /// Which credential set the relay was built with
    pub environment: Environment,
    /// Redirect target for unknown import stages; error page when `None`
    pub unknown_stage_redirect: Option<Arc<str>>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(relay: ImportRelay, environment: Environment) -> Self {
        Self {
            relay: Arc::new(relay),
            environment,
            unknown_stage_redirect: None,
            startup_time: Utc::now(),
        }
    }

    pub fn with_unknown_stage_redirect(mut self, target: impl Into<Arc<str>>) -> Self {
        self.unknown_stage_redirect = Some(target.into());
        self
    }

    /// Build state with the reqwest transport from resolved configuration
    pub fn from_config(config: &RelayConfig) -> anyhow::Result<Self> {
        let urls = UrlBuilder::new(config.base_url.clone(), config.credentials.clone())?;
        let transport = ReqwestTransport::new(config.upstream_timeout)?;
        let relay = ImportRelay::new(urls, Arc::new(transport));

        let mut state = Self::new(relay, config.environment);
        if let Some(target) = &config.unknown_stage_redirect {
            state = state.with_unknown_stage_redirect(target.as_str());
        }
        Ok(state)
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::import_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
