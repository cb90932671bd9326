//! Synchronous JSON-over-HTTP client shared by the Confluence and Jira crates.

use std::time::Duration;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use ureq::Agent;

use crate::auth::Auth;
use crate::error::ApiError;

/// Default HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT: u64 = 30;

/// Characters left unescaped in query components.
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode one path segment or query component.
#[must_use]
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, QUERY_ENCODE_SET).to_string()
}

/// Authenticated REST client for one Atlassian product.
///
/// One request per call, no retries. Error statuses are returned as
/// [`ApiError::HttpResponse`] with the response body attached.
pub struct RestClient {
    agent: Agent,
    base_url: String,
    auth: Auth,
}

impl RestClient {
    /// Create a client for `base_url`.
    #[must_use]
    pub fn new(base_url: &str, auth: Auth, timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
            auth,
        }
    }

    /// Base URL without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build an absolute URL from a path below the base URL and query pairs.
    ///
    /// Query values are percent-encoded; pairs are kept in the given order.
    #[must_use]
    pub fn url(&self, path: &str, query: &[(&str, &str)]) -> String {
        let mut url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        for (i, (key, value)) in query.iter().enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.push_str(&encode_component(key));
            url.push('=');
            url.push_str(&encode_component(value));
        }
        url
    }

    /// GET `url` and decode the JSON body.
    pub fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        debug!("GET {}", url);

        let auth_header = self.auth.header("GET", url)?;
        let response = self
            .agent
            .get(url)
            .header("Authorization", &auth_header)
            .header("Accept", "application/json")
            .call()?;

        read_json(response)
    }

    /// POST a JSON payload to `url` and decode the JSON response.
    pub fn post<T: DeserializeOwned>(&self, url: &str, payload: &Value) -> Result<T, ApiError> {
        debug!("POST {}", url);

        let auth_header = self.auth.header("POST", url)?;
        let payload_bytes = serde_json::to_vec(payload)?;
        let response = self
            .agent
            .post(url)
            .header("Authorization", &auth_header)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&payload_bytes[..])?;

        read_json(response)
    }

    /// PUT a JSON payload to `url` and decode the JSON response.
    pub fn put<T: DeserializeOwned>(&self, url: &str, payload: &Value) -> Result<T, ApiError> {
        let response = self.send_put(url, payload)?;
        read_json(response)
    }

    /// PUT a JSON payload to `url`, ignoring any response body.
    ///
    /// For endpoints that answer `204 No Content`.
    pub fn put_no_content(&self, url: &str, payload: &Value) -> Result<(), ApiError> {
        let response = self.send_put(url, payload)?;
        check_status(response).map(drop)
    }

    fn send_put(
        &self,
        url: &str,
        payload: &Value,
    ) -> Result<ureq::http::Response<ureq::Body>, ApiError> {
        debug!("PUT {}", url);

        let auth_header = self.auth.header("PUT", url)?;
        let payload_bytes = serde_json::to_vec(payload)?;
        Ok(self
            .agent
            .put(url)
            .header("Authorization", &auth_header)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&payload_bytes[..])?)
    }
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url)
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}

/// Turn an error status into [`ApiError::HttpResponse`], passing the body through otherwise.
fn check_status(response: ureq::http::Response<ureq::Body>) -> Result<ureq::Body, ApiError> {
    let status = response.status().as_u16();
    let mut body_reader = response.into_body();

    if status >= 400 {
        let error_body = body_reader
            .read_to_string()
            .unwrap_or_else(|_| "(unable to read error body)".to_owned());
        return Err(ApiError::HttpResponse {
            status,
            body: error_body,
        });
    }

    Ok(body_reader)
}

fn read_json<T: DeserializeOwned>(response: ureq::http::Response<ureq::Body>) -> Result<T, ApiError> {
    let mut body_reader = check_status(response)?;
    Ok(body_reader.read_json()?)
}
