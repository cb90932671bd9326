//! Seam between comment/worklog operations and the Jira REST API.

use atl_client::ApiError;
use serde_json::Value;

/// Jira operations the comment and worklog services need.
///
/// Responses are returned as raw JSON so the services can check their
/// shape before mapping them. [`JiraClient`](crate::JiraClient) talks to a
/// live instance; `MockJiraApi` serves canned responses in tests.
pub trait JiraApi {
    /// Base URL of the instance, without trailing slash.
    fn base_url(&self) -> &str;

    /// Absolute URL of a REST resource, e.g. `issue` for `<base>/rest/api/2/issue`.
    fn resource_url(&self, resource: &str) -> String;

    /// POST a JSON payload to an absolute URL.
    fn post(&self, url: &str, payload: &Value) -> Result<Value, ApiError>;

    /// Comments of an issue, with entity properties expanded.
    fn issue_get_comments(&self, issue_key: &str) -> Result<Value, ApiError>;

    /// Add a comment with a wiki-markup body.
    fn issue_add_comment(&self, issue_key: &str, body: &str) -> Result<Value, ApiError>;

    /// Worklogs of an issue.
    fn issue_get_worklog(&self, issue_key: &str) -> Result<Value, ApiError>;

    /// Add a worklog.
    ///
    /// With `new_estimate` the remaining estimate is set to it, otherwise
    /// Jira adjusts it automatically.
    fn issue_add_worklog(
        &self,
        issue_key: &str,
        worklog: &Value,
        new_estimate: Option<&str>,
    ) -> Result<Value, ApiError>;

    /// Set fields on an issue.
    fn update_issue_fields(&self, issue_key: &str, fields: &Value) -> Result<(), ApiError>;
}
