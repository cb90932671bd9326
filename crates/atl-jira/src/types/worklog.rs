//! Jira worklog types.

use serde::{Deserialize, Serialize};

use super::RawUser;

/// Worklog listing for an issue.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RawWorklogPage {
    #[serde(deserialize_with = "super::null_as_default")]
    pub worklogs: Vec<RawWorklog>,
    #[serde(rename = "startAt", deserialize_with = "super::null_as_default")]
    pub start_at: u64,
    #[serde(rename = "maxResults", deserialize_with = "super::null_as_default")]
    pub max_results: u64,
    #[serde(deserialize_with = "super::null_as_default")]
    pub total: u64,
}

/// Worklog entry.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RawWorklog {
    #[serde(deserialize_with = "super::null_as_default")]
    pub id: String,
    /// Comment in Jira wiki markup.
    #[serde(deserialize_with = "super::null_as_default")]
    pub comment: String,
    pub created: Option<String>,
    pub updated: Option<String>,
    pub started: Option<String>,
    /// Duration as entered, e.g. `1h 30m`.
    #[serde(rename = "timeSpent", deserialize_with = "super::null_as_default")]
    pub time_spent: String,
    #[serde(rename = "timeSpentSeconds", deserialize_with = "super::null_as_default")]
    pub time_spent_seconds: u64,
    pub author: Option<RawUser>,
}
