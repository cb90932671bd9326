//! Jira REST API response types.
//!
//! Every field defaults when absent or `null`, so sparse responses map to
//! empty strings, zero and missing timestamps instead of failing.

mod comment;
mod worklog;

pub use comment::{PUBLIC_COMMENT_PROPERTY, RawComment, RawCommentPage, RawProperty};
pub use worklog::{RawWorklog, RawWorklogPage};

use serde::{Deserialize, Deserializer, Serialize};

/// Author shown when a record carries no display name.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Jira user reference.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RawUser {
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
    /// Username (Server/Data Center).
    pub name: Option<String>,
    /// Account ID (Cloud).
    #[serde(rename = "accountId")]
    pub account_id: Option<String>,
}

/// Deserialize `null` as the type's default value.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Display name of an optional author, or [`UNKNOWN_AUTHOR`].
pub(crate) fn author_name(author: Option<&RawUser>) -> String {
    author
        .and_then(|user| user.display_name.clone())
        .unwrap_or_else(|| UNKNOWN_AUTHOR.to_owned())
}
