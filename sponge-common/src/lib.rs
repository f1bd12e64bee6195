//! # Sponge Common Library
//!
//! Shared code for the contact-import relay:
//! - Error and result types
//! - Bootstrap configuration (TOML file discovery and loading)
//! - Environment selection and the upstream credential pair

pub mod config;
pub mod error;

pub use config::{Credentials, Environment};
pub use error::{Error, Result};
