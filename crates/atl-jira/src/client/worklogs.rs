//! Worklog and time tracking operations for Jira API.

use atl_client::{ApiError, encode_component};
use serde_json::{Value, json};
use tracing::info;

use super::JiraClient;

impl JiraClient {
    /// Get all worklogs on an issue.
    pub(crate) fn get_worklogs(&self, issue_key: &str) -> Result<Value, ApiError> {
        info!("Getting worklogs for issue {}", issue_key);
        let url = self.issue_url(issue_key, "worklog", &[]);
        self.rest.get(&url)
    }

    /// Log work, optionally setting the remaining estimate.
    pub(crate) fn add_worklog(
        &self,
        issue_key: &str,
        worklog: &Value,
        new_estimate: Option<&str>,
    ) -> Result<Value, ApiError> {
        info!("Adding worklog to issue {}", issue_key);
        let url = match new_estimate {
            Some(estimate) => self.issue_url(
                issue_key,
                "worklog",
                &[("adjustEstimate", "new"), ("newEstimate", estimate)],
            ),
            None => self.issue_url(issue_key, "worklog", &[]),
        };
        self.rest.post(&url, worklog)
    }

    /// Set issue fields. Jira answers `204 No Content`.
    pub(crate) fn update_fields(&self, issue_key: &str, fields: &Value) -> Result<(), ApiError> {
        info!("Updating fields of issue {}", issue_key);
        let url = self.rest.url(
            &format!("rest/api/2/issue/{}", encode_component(issue_key)),
            &[],
        );
        self.rest.put_no_content(&url, &json!({"fields": fields}))
    }
}
