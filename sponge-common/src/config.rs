//! Bootstrap configuration loading
//!
//! The relay reads a single TOML file at startup. Every field is optional so a
//! missing or partial file still lets the process start; required values
//! (the credential pair) are checked by the relay when it resolves its
//! runtime configuration.
//!
//! # Example
//!
//! ```toml
//! environment = "development"
//! bind = "127.0.0.1:5780"
//!
//! [logging]
//! level = "debug"
//!
//! [auth.local]
//! domain_key = "DEV-KEY"
//! domain_password = "dev-secret"
//!
//! [auth.server]
//! domain_key = "PROD-KEY"
//! domain_password = "prod-secret"
//! ```

use crate::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Directory name under the platform config dir
const CONFIG_DIR_NAME: &str = "sponge";

/// Deployment environment, selects which credential pair is used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Local development (`[auth.local]`)
    Development,
    /// Deployed server (`[auth.server]`)
    #[default]
    Production,
}

impl Environment {
    /// Name of the `[auth.*]` TOML section holding this environment's credentials
    pub fn auth_section(&self) -> &'static str {
        match self {
            Environment::Development => "local",
            Environment::Production => "server",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" => Ok(Environment::Development),
            "production" | "prod" | "server" => Ok(Environment::Production),
            other => Err(Error::InvalidInput(format!(
                "Unknown environment '{}' (expected development or production)",
                other
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for Environment {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Upstream account credentials (domain key + domain password)
///
/// Held by the server only; never sent to the browser. `Debug` output masks
/// both values so the pair can be logged as part of larger structs.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    domain_key: String,
    domain_password: String,
}

impl Credentials {
    pub fn new(domain_key: impl Into<String>, domain_password: impl Into<String>) -> Self {
        Self {
            domain_key: domain_key.into(),
            domain_password: domain_password.into(),
        }
    }

    pub fn domain_key(&self) -> &str {
        &self.domain_key
    }

    pub fn domain_password(&self) -> &str {
        &self.domain_password
    }

    /// Both values are non-empty after trimming
    pub fn is_complete(&self) -> bool {
        !self.domain_key.trim().is_empty() && !self.domain_password.trim().is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("domain_key", &"***")
            .field("domain_password", &"***")
            .finish()
    }
}

/// `[auth]` table: one credential pair per environment
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub local: Option<Credentials>,
    #[serde(default)]
    pub server: Option<Credentials>,
}

impl AuthConfig {
    /// Credential pair for the given environment, if configured
    pub fn credentials_for(&self, environment: Environment) -> Option<&Credentials> {
        match environment {
            Environment::Development => self.local.as_ref(),
            Environment::Production => self.server.as_ref(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub environment: Option<Environment>,

    /// HTTP listen address (e.g. "127.0.0.1:5780")
    #[serde(default)]
    pub bind: Option<String>,

    /// Upstream API base URL
    #[serde(default)]
    pub base_url: Option<String>,

    /// Upstream request timeout in seconds
    #[serde(default)]
    pub upstream_timeout_secs: Option<u64>,

    /// Where to send browsers that request an unknown import stage.
    /// When unset an error page is rendered instead.
    #[serde(default)]
    pub unknown_stage_redirect: Option<String>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub auth: AuthConfig,
}

/// Default config file location for a module: `<config_dir>/sponge/<module>.toml`
pub fn default_config_path(module_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(format!("{}.toml", module_name)))
}

/// Pick the config file to load
///
/// An explicit path (CLI flag or environment variable) always wins, even if the
/// file does not exist, so a typo surfaces as a "not found" warning instead of
/// silently loading some other file. Otherwise the platform default is used.
pub fn resolve_config_path(explicit: Option<&Path>, module_name: &str) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path(module_name),
    }
}

/// Parse TOML configuration text
pub fn parse_toml_config(content: &str) -> Result<TomlConfig> {
    toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

/// Load the TOML file at `path`
///
/// Returns `Ok(None)` when the file does not exist. Read or parse failures
/// are errors.
pub fn load_toml_config(path: &Path) -> Result<Option<TomlConfig>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;
    let config = parse_toml_config(&content)?;

    debug!("Loaded configuration from {}", path.display());
    Ok(Some(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_aliases() {
        assert_eq!("development".parse::<Environment>().unwrap(), Environment::Development);
        assert_eq!("LOCAL".parse::<Environment>().unwrap(), Environment::Development);
        assert_eq!("dev".parse::<Environment>().unwrap(), Environment::Development);
        assert_eq!("server".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!(" Prod ".parse::<Environment>().unwrap(), Environment::Production);
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn test_environment_default_is_production() {
        assert_eq!(Environment::default(), Environment::Production);
        assert_eq!(Environment::default().auth_section(), "server");
        assert_eq!(Environment::Development.auth_section(), "local");
    }

    #[test]
    fn test_credentials_debug_masks_values() {
        let creds = Credentials::new("KEY-123", "hunter2");
        let rendered = format!("{:?}", creds);
        assert!(!rendered.contains("KEY-123"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_credentials_completeness() {
        assert!(Credentials::new("k", "p").is_complete());
        assert!(!Credentials::new("k", "  ").is_complete());
        assert!(!Credentials::new("", "p").is_complete());
    }

    #[test]
    fn test_credentials_for_selects_exactly_one_pair() {
        let auth = AuthConfig {
            local: Some(Credentials::new("dev-key", "dev-pass")),
            server: Some(Credentials::new("prod-key", "prod-pass")),
        };

        let dev = auth.credentials_for(Environment::Development).unwrap();
        assert_eq!(dev.domain_key(), "dev-key");
        assert_eq!(dev.domain_password(), "dev-pass");

        let prod = auth.credentials_for(Environment::Production).unwrap();
        assert_eq!(prod.domain_key(), "prod-key");
        assert_eq!(prod.domain_password(), "prod-pass");
    }

    #[test]
    fn test_explicit_config_path_wins() {
        let explicit = PathBuf::from("/tmp/does-not-exist/relay.toml");
        let resolved = resolve_config_path(Some(&explicit), "sponge-relay");
        assert_eq!(resolved, Some(explicit));
    }
}
