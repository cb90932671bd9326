//! Confluence REST API client.
//!
//! Sync client for the Confluence Cloud and Server/Data Center
//! `rest/api` endpoints, with whichever auth scheme the config names.

mod pages;
mod spaces;

use std::time::Duration;

use atl_client::{ApiError, Auth, RestClient};
use atl_config::ConfluenceConfig;

/// Confluence REST API client.
#[derive(Debug)]
pub struct ConfluenceClient {
    rest: RestClient,
}

impl ConfluenceClient {
    /// Create a client over an existing transport.
    #[must_use]
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    /// Create client from config values.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RsaKey`] if an OAuth private key cannot be loaded.
    pub fn from_config(config: &ConfluenceConfig) -> Result<Self, ApiError> {
        let auth = Auth::from_config(&config.auth)?;
        Ok(Self::new(RestClient::new(
            &config.url,
            auth,
            Duration::from_secs(config.timeout_secs),
        )))
    }

    /// Absolute URL of a `rest/api` resource.
    fn api_url(&self, path: &str, query: &[(&str, &str)]) -> String {
        self.rest.url(&format!("rest/api/{path}"), query)
    }
}

#[cfg(test)]
mod tests {
    use atl_config::AuthConfig;

    use super::*;

    #[test]
    fn test_api_url() {
        let client = ConfluenceClient::from_config(&ConfluenceConfig {
            url: "https://acme.atlassian.net/wiki/".to_owned(),
            timeout_secs: 5,
            auth: AuthConfig::Token {
                personal_token: "pat".to_owned(),
            },
        })
        .unwrap();

        assert_eq!(
            client.api_url("content/42", &[("expand", "version")]),
            "https://acme.atlassian.net/wiki/rest/api/content/42?expand=version"
        );
    }
}
