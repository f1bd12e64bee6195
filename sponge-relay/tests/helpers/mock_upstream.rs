//! Fake upstreams: an in-process transport and a local HTTP server

use async_trait::async_trait;
use axum::http::{StatusCode, Uri};
use axum::Router;
use reqwest::Url;
use sponge_relay::models::UpstreamBody;
use sponge_relay::services::{TransportError, UpstreamTransport};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

/// Records every URL fetched and answers with a fixed reply
pub struct RecordingTransport {
    urls: Mutex<Vec<String>>,
    reply: Result<Vec<u8>, u16>,
}

impl RecordingTransport {
    pub fn replying(body: &[u8]) -> Arc<Self> {
        Arc::new(Self {
            urls: Mutex::new(Vec::new()),
            reply: Ok(body.to_vec()),
        })
    }

    pub fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            urls: Mutex::new(Vec::new()),
            reply: Err(status),
        })
    }

    pub fn requested(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl UpstreamTransport for RecordingTransport {
    async fn fetch(&self, url: &Url) -> Result<UpstreamBody, TransportError> {
        self.urls.lock().unwrap().push(url.to_string());
        match &self.reply {
            Ok(body) => Ok(UpstreamBody::new(body.clone())),
            Err(status) => Err(TransportError::Status(*status)),
        }
    }
}

/// Local HTTP server standing in for the upstream API
pub struct MockUpstream {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockUpstream {
    pub fn base_url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Path and query of every request received
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Serve `body` with `status` for every path
pub async fn spawn_mock_upstream(status: StatusCode, body: &'static [u8]) -> MockUpstream {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = requests.clone();

    let app = Router::new().fallback(move |uri: Uri| {
        let recorded = recorded.clone();
        async move {
            let path_and_query = uri
                .path_and_query()
                .map(|pq| pq.to_string())
                .unwrap_or_default();
            recorded.lock().unwrap().push(path_and_query);
            (status, body)
        }
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockUpstream { addr, requests }
}
