//! Jira REST API client.
//!
//! Sync client for the Jira Cloud and Server/Data Center `rest/api/2`
//! endpoints, with whichever auth scheme the config names.

mod comments;
mod worklogs;

use std::time::Duration;

use atl_client::{ApiError, Auth, RestClient, encode_component};
use atl_config::JiraConfig;
use serde_json::Value;

use crate::api::JiraApi;

/// Jira REST API client.
#[derive(Debug)]
pub struct JiraClient {
    rest: RestClient,
}

impl JiraClient {
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
    pub fn from_config(config: &JiraConfig) -> Result<Self, ApiError> {
        let auth = Auth::from_config(&config.auth)?;
        Ok(Self::new(RestClient::new(
            &config.url,
            auth,
            Duration::from_secs(config.timeout_secs),
        )))
    }

    /// Absolute URL of an issue sub-resource.
    fn issue_url(&self, issue_key: &str, resource: &str, query: &[(&str, &str)]) -> String {
        self.rest.url(
            &format!("rest/api/2/issue/{}/{resource}", encode_component(issue_key)),
            query,
        )
    }
}

impl JiraApi for JiraClient {
    fn base_url(&self) -> &str {
        self.rest.base_url()
    }

    fn resource_url(&self, resource: &str) -> String {
        self.rest.url(&format!("rest/api/2/{resource}"), &[])
    }

    fn post(&self, url: &str, payload: &Value) -> Result<Value, ApiError> {
        self.rest.post(url, payload)
    }

    fn issue_get_comments(&self, issue_key: &str) -> Result<Value, ApiError> {
        self.get_comments(issue_key)
    }

    fn issue_add_comment(&self, issue_key: &str, body: &str) -> Result<Value, ApiError> {
        self.add_comment(issue_key, body)
    }

    fn issue_get_worklog(&self, issue_key: &str) -> Result<Value, ApiError> {
        self.get_worklogs(issue_key)
    }

    fn issue_add_worklog(
        &self,
        issue_key: &str,
        worklog: &Value,
        new_estimate: Option<&str>,
    ) -> Result<Value, ApiError> {
        self.add_worklog(issue_key, worklog, new_estimate)
    }

    fn update_issue_fields(&self, issue_key: &str, fields: &Value) -> Result<(), ApiError> {
        self.update_fields(issue_key, fields)
    }
}
