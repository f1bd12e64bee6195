//! Runtime configuration resolution for sponge-relay
//!
//! Each setting is resolved with CLI → ENV → TOML → built-in default
//! priority. The CLI and ENV tiers arrive together through clap (see
//! `main.rs`) as [`ConfigOverrides`].
//!
//! Credentials are resolved once here. A missing pair is a startup error,
//! never a per-request one.

use reqwest::Url;
use sponge_common::config::TomlConfig;
use sponge_common::{Credentials, Environment, Error, Result};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{info, warn};

use crate::services::transport::DEFAULT_TIMEOUT_SECS;
use crate::services::url_builder::DEFAULT_BASE_URL;

pub const MODULE_NAME: &str = "sponge-relay";
pub const DEFAULT_BIND: &str = "127.0.0.1:5780";

pub const ENV_DOMAIN_KEY: &str = "SPONGE_DOMAIN_KEY";
pub const ENV_DOMAIN_PASSWORD: &str = "SPONGE_DOMAIN_PASSWORD";

/// Values supplied on the command line or through their environment variables
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub bind: Option<SocketAddr>,
    pub environment: Option<Environment>,
    pub base_url: Option<String>,
}

/// Fully resolved relay configuration
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub bind: SocketAddr,
    pub environment: Environment,
    pub credentials: Credentials,
    pub base_url: Url,
    pub upstream_timeout: Duration,
    pub unknown_stage_redirect: Option<String>,
}

impl RelayConfig {
    pub fn resolve(overrides: &ConfigOverrides, toml_config: &TomlConfig) -> Result<Self> {
        let environment = overrides
            .environment
            .or(toml_config.environment)
            .unwrap_or_default();

        let bind = match overrides.bind {
            Some(addr) => addr,
            None => {
                let raw = toml_config.bind.as_deref().unwrap_or(DEFAULT_BIND);
                raw.parse()
                    .map_err(|e| Error::Config(format!("Invalid bind address '{}': {}", raw, e)))?
            }
        };

        let raw_base = overrides
            .base_url
            .as_deref()
            .or(toml_config.base_url.as_deref())
            .unwrap_or(DEFAULT_BASE_URL);
        let base_url = Url::parse(raw_base)
            .map_err(|e| Error::Config(format!("Invalid upstream base URL '{}': {}", raw_base, e)))?;

        let timeout_secs = toml_config.upstream_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(Error::Config(
                "upstream_timeout_secs must be greater than zero".to_string(),
            ));
        }

        let unknown_stage_redirect = toml_config
            .unknown_stage_redirect
            .as_deref()
            .map(str::trim)
            .filter(|target| !target.is_empty())
            .map(str::to_string);

        let credentials = resolve_credentials(environment, toml_config)?;

        Ok(Self {
            bind,
            environment,
            credentials,
            base_url,
            upstream_timeout: Duration::from_secs(timeout_secs),
            unknown_stage_redirect,
        })
    }
}

/// Resolve the credential pair for `environment`
///
/// **Priority:** ENV pair → TOML `[auth.local]` / `[auth.server]`
///
/// The environment variables only count as a complete pair; setting one
/// without the other is rejected rather than mixed with TOML values.
pub fn resolve_credentials(environment: Environment, toml_config: &TomlConfig) -> Result<Credentials> {
    let env_key = std::env::var(ENV_DOMAIN_KEY).ok().filter(|v| is_valid_key(v));
    let env_password = std::env::var(ENV_DOMAIN_PASSWORD).ok().filter(|v| is_valid_key(v));
    let toml_pair = toml_config
        .auth
        .credentials_for(environment)
        .filter(|c| c.is_complete());

    match (env_key, env_password) {
        (Some(key), Some(password)) => {
            if toml_pair.is_some() {
                warn!(
                    "Credentials found in both environment and TOML [auth.{}]. Using environment.",
                    environment.auth_section()
                );
            }
            info!("Upstream credentials loaded from environment variables");
            Ok(Credentials::new(key, password))
        }
        (Some(_), None) | (None, Some(_)) => Err(Error::Config(format!(
            "Only one of {} / {} is set; both are required",
            ENV_DOMAIN_KEY, ENV_DOMAIN_PASSWORD
        ))),
        (None, None) => match toml_pair {
            Some(pair) => {
                info!(
                    "Upstream credentials loaded from TOML [auth.{}]",
                    environment.auth_section()
                );
                Ok(pair.clone())
            }
            None => Err(Error::Config(format!(
                "Upstream credentials not configured for {} environment. Configure using one of:\n\
                 1. Environment: {}=... and {}=...\n\
                 2. TOML config: [auth.{}] domain_key = \"...\", domain_password = \"...\"",
                environment,
                ENV_DOMAIN_KEY,
                ENV_DOMAIN_PASSWORD,
                environment.auth_section()
            ))),
        },
    }
}

/// Non-empty, non-whitespace
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
