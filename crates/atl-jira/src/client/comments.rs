//! Comment operations for Jira API.

use atl_client::ApiError;
use serde_json::{Value, json};
use tracing::info;

use super::JiraClient;

impl JiraClient {
    /// Get all comments on an issue.
    pub(crate) fn get_comments(&self, issue_key: &str) -> Result<Value, ApiError> {
        info!("Getting comments for issue {}", issue_key);
        let url = self.issue_url(issue_key, "comment", &[("expand", "properties")]);
        self.rest.get(&url)
    }

    /// Add a comment visible to everyone who can see the issue.
    pub(crate) fn add_comment(&self, issue_key: &str, body: &str) -> Result<Value, ApiError> {
        info!("Adding comment to issue {}", issue_key);
        let url = self.issue_url(issue_key, "comment", &[]);
        self.rest.post(&url, &json!({"body": body}))
    }
}
