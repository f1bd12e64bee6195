//! Credential redaction for logged URLs

use reqwest::Url;

pub const REDACTED: &str = "REDACTED";

/// Query parameters whose values never reach the logs
const SENSITIVE_PARAMS: &[&str] = &["domain_key", "domain_password", "password"];

/// Render `url` for logging with sensitive query values replaced
pub fn redact_url(url: &Url) -> String {
    let mut redacted = url.clone();
    if !url.password().unwrap_or_default().is_empty() {
        let _ = redacted.set_password(Some(REDACTED));
    }

    if url.query().is_none() {
        return redacted.to_string();
    }

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| {
            let value = if SENSITIVE_PARAMS.contains(&key.as_ref()) {
                REDACTED.to_string()
            } else {
                value.into_owned()
            };
            (key.into_owned(), value)
        })
        .collect();

    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}
