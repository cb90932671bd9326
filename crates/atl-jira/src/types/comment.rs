//! Jira comment types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::RawUser;

/// Property key Jira Service Management uses for comment visibility.
pub const PUBLIC_COMMENT_PROPERTY: &str = "sd.public.comment";

/// Comment listing for an issue.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RawCommentPage {
    #[serde(deserialize_with = "super::null_as_default")]
    pub comments: Vec<RawComment>,
    #[serde(rename = "startAt", deserialize_with = "super::null_as_default")]
    pub start_at: u64,
    #[serde(rename = "maxResults", deserialize_with = "super::null_as_default")]
    pub max_results: u64,
    #[serde(deserialize_with = "super::null_as_default")]
    pub total: u64,
}

/// Comment as returned by the issue comment API.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RawComment {
    #[serde(deserialize_with = "super::null_as_default")]
    pub id: String,
    /// Body in Jira wiki markup.
    #[serde(deserialize_with = "super::null_as_default")]
    pub body: String,
    pub created: Option<String>,
    pub updated: Option<String>,
    pub author: Option<RawUser>,
    /// Present when `properties` is expanded.
    #[serde(deserialize_with = "super::null_as_default")]
    pub properties: Vec<RawProperty>,
}

impl RawComment {
    /// Value of the `internal` flag in the `sd.public.comment` property.
    #[must_use]
    pub fn internal_flag(&self) -> Option<bool> {
        self.properties
            .iter()
            .find(|property| property.key == PUBLIC_COMMENT_PROPERTY)
            .and_then(|property| property.value.get("internal"))
            .and_then(Value::as_bool)
    }
}

/// Entity property attached to a comment.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RawProperty {
    #[serde(deserialize_with = "super::null_as_default")]
    pub key: String,
    pub value: Value,
}
