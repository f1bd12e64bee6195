//! Request and response types for the import relay
//!
//! The browser-facing path carries a single `param` whose meaning depends on
//! the stage: a provider name for `start`, an upstream import id afterwards.
//! [`ImportRequest`] splits that into typed variants at the boundary.

use axum::{
    body::Bytes,
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::services::url_builder::is_unsafe_segment;

/// Stage of the three-step import flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStage {
    /// Begin an import for a provider
    Start,
    /// Poll the upstream job
    Progress,
    /// Retrieve the imported contacts
    Final,
}

/// Stage segment outside `start` / `progress` / `final`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unrecognized import stage: {0}")]
pub struct UnrecognizedStage(pub String);

impl FromStr for ImportStage {
    type Err = UnrecognizedStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(ImportStage::Start),
            "progress" => Ok(ImportStage::Progress),
            "final" => Ok(ImportStage::Final),
            other => Err(UnrecognizedStage(other.to_string())),
        }
    }
}

impl fmt::Display for ImportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImportStage::Start => "start",
            ImportStage::Progress => "progress",
            ImportStage::Final => "final",
        };
        f.write_str(name)
    }
}

/// Username/password for providers that need direct login (AOL, PLAXO)
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderLogin {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for ProviderLogin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderLogin")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Form body accepted on POST
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Only one of username/password was supplied
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Both username and password are required for a direct-login import")]
pub struct PartialLogin;

impl LoginForm {
    /// Both fields absent selects the OAuth flow, both present the direct-login
    /// flow. Empty strings count as present.
    pub fn into_login(self) -> Result<Option<ProviderLogin>, PartialLogin> {
        match (self.username, self.password) {
            (None, None) => Ok(None),
            (Some(username), Some(password)) => Ok(Some(ProviderLogin { username, password })),
            _ => Err(PartialLogin),
        }
    }
}

/// Path parameter that cannot be forwarded (`""`, `.`, `..`)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid import parameter: '{0}'")]
pub struct InvalidParam(pub String);

fn check_param(param: String) -> Result<String, InvalidParam> {
    if is_unsafe_segment(&param) {
        Err(InvalidParam(param))
    } else {
        Ok(param)
    }
}

/// A browser request resolved to one relay operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportRequest {
    Start {
        provider: String,
        login: Option<ProviderLogin>,
    },
    Progress {
        import_id: String,
    },
    Final {
        import_id: String,
    },
}

impl ImportRequest {
    /// Build from a GET path. `start` never carries a login on GET.
    pub fn from_path(stage: ImportStage, param: String) -> Result<Self, InvalidParam> {
        let param = check_param(param)?;
        Ok(match stage {
            ImportStage::Start => ImportRequest::Start {
                provider: param,
                login: None,
            },
            ImportStage::Progress => ImportRequest::Progress { import_id: param },
            ImportStage::Final => ImportRequest::Final { import_id: param },
        })
    }

    /// Start request with an optional direct login (POST)
    pub fn start(provider: String, login: Option<ProviderLogin>) -> Result<Self, InvalidParam> {
        Ok(ImportRequest::Start {
            provider: check_param(provider)?,
            login,
        })
    }

    pub fn stage(&self) -> ImportStage {
        match self {
            ImportRequest::Start { .. } => ImportStage::Start,
            ImportRequest::Progress { .. } => ImportStage::Progress,
            ImportRequest::Final { .. } => ImportStage::Final,
        }
    }
}

/// Raw upstream response body
///
/// Forwarded to the browser unchanged and labelled as JSON. The relay does not
/// parse or validate it, so callers get no schema guarantee from this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamBody(Bytes);

impl UpstreamBody {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoResponse for UpstreamBody {
    fn into_response(self) -> Response {
        ([(header::CONTENT_TYPE, "application/json")], self.0).into_response()
    }
}
