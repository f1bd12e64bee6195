//! Upstream URL construction
//!
//! Every upstream URL is `base + path segments + ordered query`, with the
//! domain credentials appended as the last two query parameters. Path
//! segments and query values are percent-encoded, so provider names, login
//! fields, and import ids cannot change the shape of the URL. Segments that
//! would be dropped or resolved away (`""`, `.`, `..`) are rejected.

use reqwest::Url;
use sponge_common::{Credentials, Error, Result};

/// Production contact-import API
pub const DEFAULT_BASE_URL: &str = "https://api.cloudsponge.com/";

/// One of the four upstream calls the relay makes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamRequest<'a> {
    /// OAuth consent flow (GMAIL, YAHOO, WINDOWSLIVE)
    BeginConsent { service: &'a str },
    /// Direct-login flow (AOL, PLAXO)
    BeginImport {
        username: &'a str,
        password: &'a str,
        service: &'a str,
    },
    /// Poll import events
    Events { import_id: &'a str },
    /// Fetch imported contacts
    Contacts { import_id: &'a str },
}

impl<'a> UpstreamRequest<'a> {
    pub fn path_segments(&self) -> Vec<&'a str> {
        match *self {
            UpstreamRequest::BeginConsent { .. } => vec!["begin_import", "user_consent"],
            UpstreamRequest::BeginImport { .. } => vec!["begin_import", "import"],
            UpstreamRequest::Events { import_id } => vec!["events", import_id],
            UpstreamRequest::Contacts { import_id } => vec!["contacts", import_id],
        }
    }

    /// Query parameters in wire order, before the credentials
    pub fn query(&self) -> Vec<(&'static str, &'a str)> {
        match *self {
            UpstreamRequest::BeginConsent { service } => vec![("service", service)],
            UpstreamRequest::BeginImport {
                username,
                password,
                service,
            } => vec![
                ("username", username),
                ("password", password),
                ("service", service),
            ],
            UpstreamRequest::Events { .. } | UpstreamRequest::Contacts { .. } => Vec::new(),
        }
    }
}

/// Builds credentialed upstream URLs
#[derive(Debug, Clone)]
pub struct UrlBuilder {
    base: Url,
    credentials: Credentials,
}

impl UrlBuilder {
    /// Base URL must be hierarchical (http/https with a path)
    pub fn new(mut base: Url, credentials: Credentials) -> Result<Self> {
        if base.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "Upstream base URL cannot carry a path: {}",
                base
            )));
        }
        base.set_query(None);
        base.set_fragment(None);

        Ok(Self { base, credentials })
    }

    pub fn parse(base: &str, credentials: Credentials) -> Result<Self> {
        let url = Url::parse(base)
            .map_err(|e| Error::Config(format!("Invalid upstream base URL '{}': {}", base, e)))?;
        Self::new(url, credentials)
    }

    /// Append `segments` to the base path and `query` (in order) to the query
    /// string, followed by `domain_key` and `domain_password`.
    pub fn build(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url> {
        if let Some(bad) = segments.iter().find(|s| is_unsafe_segment(s)) {
            return Err(Error::InvalidInput(format!(
                "Path segment '{}' is not allowed",
                bad
            )));
        }

        let mut url = self.base.clone();

        // Checked in new()
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }

        url.query_pairs_mut()
            .extend_pairs(query.iter().copied())
            .append_pair("domain_key", self.credentials.domain_key())
            .append_pair("domain_password", self.credentials.domain_password());

        Ok(url)
    }
}

/// Empty and dot segments are dropped or normalized by URL path handling
pub fn is_unsafe_segment(segment: &str) -> bool {
    matches!(segment, "" | "." | "..")
}
