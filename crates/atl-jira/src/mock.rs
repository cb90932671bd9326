//! Mock Jira API for testing.
//!
//! Provides [`MockJiraApi`] for exercising comment and worklog operations
//! without a Jira instance.

use std::collections::HashMap;
use std::sync::RwLock;

use atl_client::ApiError;
use serde_json::{Value, json};

use crate::api::JiraApi;

/// Timestamp the mock stamps on records it creates.
pub const MOCK_TIMESTAMP: &str = "2024-01-01T10:00:00.000+0000";

/// Author the mock puts on records it creates.
pub const MOCK_AUTHOR: &str = "Mock User";

/// Call recorded by [`MockJiraApi`].
#[derive(Debug, Clone, PartialEq)]
pub struct MockRequest {
    /// [`JiraApi`] method name.
    pub operation: String,
    /// Issue key, or URL for [`JiraApi::post`].
    pub target: String,
    /// Request body, for writes.
    pub payload: Option<Value>,
}

/// Mock Jira API.
///
/// Serves comment and worklog listings given as the JSON the REST API
/// would return. Writes are recorded and, unless a canned response is set,
/// answered with a record echoing the request.
///
/// # Example
///
/// ```ignore
/// use atl_jira::MockJiraApi;
/// use serde_json::json;
///
/// let api = MockJiraApi::new("https://jira.example.com")
///     .with_comments("PROJ-1", json!({"comments": [{"id": "1", "body": "hi"}]}));
/// ```
#[derive(Debug)]
pub struct MockJiraApi {
    base_url: String,
    comments: RwLock<HashMap<String, Value>>,
    worklogs: RwLock<HashMap<String, Value>>,
    comment_response: RwLock<Option<Value>>,
    worklog_response: RwLock<Option<Value>>,
    failures: RwLock<HashMap<String, u16>>,
    fail_all: RwLock<Option<u16>>,
    requests: RwLock<Vec<MockRequest>>,
}

impl MockJiraApi {
    /// Create an empty mock for `base_url`.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            comments: RwLock::new(HashMap::new()),
            worklogs: RwLock::new(HashMap::new()),
            comment_response: RwLock::new(None),
            worklog_response: RwLock::new(None),
            failures: RwLock::new(HashMap::new()),
            fail_all: RwLock::new(None),
            requests: RwLock::new(Vec::new()),
        }
    }

    /// Set the comment listing response of an issue.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_comments(self, issue_key: &str, response: Value) -> Self {
        self.comments
            .write()
            .unwrap()
            .insert(issue_key.to_owned(), response);
        self
    }

    /// Set the worklog listing response of an issue.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_worklogs(self, issue_key: &str, response: Value) -> Self {
        self.worklogs
            .write()
            .unwrap()
            .insert(issue_key.to_owned(), response);
        self
    }

    /// Answer every comment creation with `response`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_comment_response(self, response: Value) -> Self {
        *self.comment_response.write().unwrap() = Some(response);
        self
    }

    /// Answer every worklog creation with `response`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_worklog_response(self, response: Value) -> Self {
        *self.worklog_response.write().unwrap() = Some(response);
        self
    }

    /// Make one operation answer with an HTTP error status.
    ///
    /// `operation` is the [`JiraApi`] method name.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_failure(self, operation: &str, status: u16) -> Self {
        self.failures
            .write()
            .unwrap()
            .insert(operation.to_owned(), status);
        self
    }

    /// Make every operation answer with an HTTP error status.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn failing(self, status: u16) -> Self {
        *self.fail_all.write().unwrap() = Some(status);
        self
    }

    /// Calls made so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests.read().unwrap().clone()
    }

    /// Calls made so far to one operation.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn requests_to(&self, operation: &str) -> Vec<MockRequest> {
        self.requests
            .read()
            .unwrap()
            .iter()
            .filter(|request| request.operation == operation)
            .cloned()
            .collect()
    }

    fn record(&self, operation: &str, target: &str, payload: Option<&Value>) -> Result<(), ApiError> {
        self.requests.write().unwrap().push(MockRequest {
            operation: operation.to_owned(),
            target: target.to_owned(),
            payload: payload.cloned(),
        });

        let status = self
            .failures
            .read()
            .unwrap()
            .get(operation)
            .copied()
            .or(*self.fail_all.read().unwrap());
        match status {
            Some(status) => Err(ApiError::HttpResponse {
                status,
                body: format!("{{\"errorMessages\": [\"mock failure in {operation}\"]}}"),
            }),
            None => Ok(()),
        }
    }

    fn created_comment(&self, body: &Value) -> Value {
        self.comment_response.read().unwrap().clone().unwrap_or_else(|| {
            json!({
                "id": (10_000 + self.requests.read().unwrap().len()).to_string(),
                "body": body,
                "created": MOCK_TIMESTAMP,
                "updated": MOCK_TIMESTAMP,
                "author": {"displayName": MOCK_AUTHOR}
            })
        })
    }
}

impl JiraApi for MockJiraApi {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn resource_url(&self, resource: &str) -> String {
        format!("{}/rest/api/2/{resource}", self.base_url)
    }

    fn post(&self, url: &str, payload: &Value) -> Result<Value, ApiError> {
        self.record("post", url, Some(payload))?;
        Ok(self.created_comment(&payload["body"]))
    }

    fn issue_get_comments(&self, issue_key: &str) -> Result<Value, ApiError> {
        self.record("issue_get_comments", issue_key, None)?;
        Ok(self
            .comments
            .read()
            .unwrap()
            .get(issue_key)
            .cloned()
            .unwrap_or_else(|| json!({"comments": []})))
    }

    fn issue_add_comment(&self, issue_key: &str, body: &str) -> Result<Value, ApiError> {
        let payload = json!({"body": body});
        self.record("issue_add_comment", issue_key, Some(&payload))?;
        Ok(self.created_comment(&payload["body"]))
    }

    fn issue_get_worklog(&self, issue_key: &str) -> Result<Value, ApiError> {
        self.record("issue_get_worklog", issue_key, None)?;
        Ok(self
            .worklogs
            .read()
            .unwrap()
            .get(issue_key)
            .cloned()
            .unwrap_or_else(|| json!({"worklogs": []})))
    }

    fn issue_add_worklog(
        &self,
        issue_key: &str,
        worklog: &Value,
        new_estimate: Option<&str>,
    ) -> Result<Value, ApiError> {
        let target = match new_estimate {
            Some(estimate) => format!("{issue_key}?adjustEstimate=new&newEstimate={estimate}"),
            None => issue_key.to_owned(),
        };
        self.record("issue_add_worklog", &target, Some(worklog))?;

        Ok(self.worklog_response.read().unwrap().clone().unwrap_or_else(|| {
            json!({
                "id": (20_000 + self.requests.read().unwrap().len()).to_string(),
                "comment": worklog.get("comment").cloned().unwrap_or_else(|| json!("")),
                "created": MOCK_TIMESTAMP,
                "updated": MOCK_TIMESTAMP,
                "started": worklog["started"],
                "timeSpentSeconds": worklog["timeSpentSeconds"],
                "author": {"displayName": MOCK_AUTHOR}
            })
        }))
    }

    fn update_issue_fields(&self, issue_key: &str, fields: &Value) -> Result<(), ApiError> {
        self.record("update_issue_fields", issue_key, Some(fields))
    }
}
