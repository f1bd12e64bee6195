//! Contact-import relay
//!
//! Forwards the browser's three-stage import flow to the upstream API with
//! server-held credentials attached:
//!
//! 1. `start` begins an import and returns an import id (OAuth consent or
//!    direct login depending on whether a provider login was supplied)
//! 2. `progress` is polled by the browser until the upstream job is ready
//! 3. `final` returns the imported contacts
//!
//! The relay keeps no job state. Each call maps to exactly one upstream GET
//! and the upstream body is passed back untouched.

use reqwest::Url;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

use crate::models::{ImportRequest, ProviderLogin, UpstreamBody};
use crate::services::redact::redact_url;
use crate::services::transport::{TransportError, UpstreamTransport};
use crate::services::url_builder::{UpstreamRequest, UrlBuilder};

/// Relay operation failure
#[derive(Debug, Error)]
pub enum RelayError {
    /// The request could not be turned into an upstream URL
    #[error(transparent)]
    InvalidRequest(#[from] sponge_common::Error),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

pub struct ImportRelay {
    urls: UrlBuilder,
    transport: Arc<dyn UpstreamTransport>,
}

impl ImportRelay {
    pub fn new(urls: UrlBuilder, transport: Arc<dyn UpstreamTransport>) -> Self {
        Self { urls, transport }
    }

    /// Build the credentialed upstream URL for `path` and `query`
    pub fn build_url(&self, path: &[&str], query: &[(&str, &str)]) -> sponge_common::Result<Url> {
        self.urls.build(path, query)
    }

    fn url_for(&self, request: &UpstreamRequest<'_>) -> sponge_common::Result<Url> {
        self.build_url(&request.path_segments(), &request.query())
    }

    /// Issue the upstream GET and return its raw body
    pub async fn call_upstream(&self, url: &Url) -> Result<UpstreamBody, TransportError> {
        let logged_url = redact_url(url);
        info!(url = %logged_url, "Calling upstream API");

        match self.transport.fetch(url).await {
            Ok(body) => {
                tracing::debug!(url = %logged_url, bytes = body.len(), "Upstream call succeeded");
                Ok(body)
            }
            Err(e) => {
                error!(url = %logged_url, error = %e, "Upstream call failed");
                Err(e)
            }
        }
    }

    /// Begin an import for `provider`
    ///
    /// Without a login the OAuth consent flow is used; with one, the login is
    /// forwarded for providers that need direct credential submission.
    pub async fn start(
        &self,
        provider: &str,
        login: Option<&ProviderLogin>,
    ) -> Result<UpstreamBody, RelayError> {
        let request = match login {
            None => UpstreamRequest::BeginConsent { service: provider },
            Some(login) => UpstreamRequest::BeginImport {
                username: &login.username,
                password: &login.password,
                service: provider,
            },
        };

        info!(
            provider = provider,
            direct_login = login.is_some(),
            "Starting contact import"
        );

        let url = self.url_for(&request)?;
        Ok(self.call_upstream(&url).await?)
    }

    /// Poll the upstream job's events
    pub async fn progress(&self, import_id: &str) -> Result<UpstreamBody, RelayError> {
        let url = self.url_for(&UpstreamRequest::Events { import_id })?;
        Ok(self.call_upstream(&url).await?)
    }

    /// Fetch the contacts of a finished import
    pub async fn final_contacts(&self, import_id: &str) -> Result<UpstreamBody, RelayError> {
        let url = self.url_for(&UpstreamRequest::Contacts { import_id })?;
        Ok(self.call_upstream(&url).await?)
    }

    pub async fn dispatch(&self, request: &ImportRequest) -> Result<UpstreamBody, RelayError> {
        match request {
            ImportRequest::Start { provider, login } => self.start(provider, login.as_ref()).await,
            ImportRequest::Progress { import_id } => self.progress(import_id).await,
            ImportRequest::Final { import_id } => self.final_contacts(import_id).await,
        }
    }
}
