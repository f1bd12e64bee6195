//! Business logic services for the relay

pub mod import_relay;
pub mod redact;
pub mod transport;
pub mod url_builder;

pub use import_relay::{ImportRelay, RelayError};
pub use redact::redact_url;
pub use transport::{ReqwestTransport, TransportError, UpstreamTransport};
pub use url_builder::{UpstreamRequest, UrlBuilder, DEFAULT_BASE_URL};
