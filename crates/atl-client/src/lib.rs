//! Authenticated HTTP transport for Atlassian REST APIs.
//!
//! [`RestClient`] wraps a sync [`ureq`] agent and signs every request with
//! one of the supported [`Auth`] schemes:
//!
//! - HTTP Basic (username + API token, Cloud)
//! - Bearer personal access token (Server/Data Center)
//! - OAuth 1.0 RSA-SHA1 (Server/Data Center application links)
//!
//! ```ignore
//! use std::time::Duration;
//! use atl_client::{Auth, RestClient};
//!
//! let client = RestClient::new(
//!     "https://acme.atlassian.net",
//!     Auth::basic("me@acme.com", "api-token"),
//!     Duration::from_secs(30),
//! );
//! let url = client.url("rest/api/2/issue/PROJ-1/comment", &[]);
//! let comments: serde_json::Value = client.get(&url)?;
//! ```

mod auth;
pub mod error;
mod oauth;
mod rest;

pub use auth::Auth;
pub use error::{ApiError, RsaKeyError};
pub use rest::{DEFAULT_TIMEOUT, RestClient, encode_component};
