//! Test Helper Utilities
//!
//! Shared utilities for testing sponge-relay

#![allow(dead_code)]

pub mod log_capture;
pub mod mock_upstream;

pub use log_capture::LogCapture;
pub use mock_upstream::{spawn_mock_upstream, MockUpstream, RecordingTransport};

use axum::body::Body;
use axum::http::Request;
use http_body_util::BodyExt;
use sponge_common::{Credentials, Environment};
use sponge_relay::services::{ImportRelay, UrlBuilder, DEFAULT_BASE_URL};
use sponge_relay::AppState;
use std::sync::Arc;

pub const TEST_DOMAIN_KEY: &str = "TEST-DOMAIN-KEY";
pub const TEST_DOMAIN_PASSWORD: &str = "test-domain-secret";

pub fn test_credentials() -> Credentials {
    Credentials::new(TEST_DOMAIN_KEY, TEST_DOMAIN_PASSWORD)
}

/// App state backed by a recording transport against the default base URL
pub fn test_app_state(transport: Arc<RecordingTransport>) -> AppState {
    let urls = UrlBuilder::parse(DEFAULT_BASE_URL, test_credentials()).unwrap();
    AppState::new(ImportRelay::new(urls, transport), Environment::Development)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_form(uri: &str, form: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap()
}

pub async fn body_bytes(body: Body) -> Vec<u8> {
    body.collect().await.unwrap().to_bytes().to_vec()
}
