//! Normalized comment and worklog records.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::dates::parse_date;
use crate::types::{RawComment, RawWorklog, author_name};
use crate::visibility::Visibility;

/// Issue comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub id: String,
    /// Body converted to readable text.
    pub body: String,
    pub created: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<FixedOffset>>,
    /// Author display name, `Unknown` when missing.
    pub author: String,
    /// Known when the comment carries the service desk visibility property,
    /// or when it was just added.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
}

impl Comment {
    pub(crate) fn from_raw(raw: &RawComment, body: String) -> Self {
        Self {
            id: raw.id.clone(),
            body,
            created: parse_date(raw.created.as_deref()),
            updated: parse_date(raw.updated.as_deref()),
            author: author_name(raw.author.as_ref()),
            visibility: raw.internal_flag().map(|internal| {
                if internal {
                    Visibility::Internal
                } else {
                    Visibility::Public
                }
            }),
        }
    }
}

/// Worklog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Worklog {
    pub id: String,
    pub comment: String,
    pub created: Option<DateTime<FixedOffset>>,
    pub updated: Option<DateTime<FixedOffset>>,
    pub started: Option<DateTime<FixedOffset>>,
    /// Duration as entered, e.g. `1h 30m`.
    pub time_spent: String,
    pub time_spent_seconds: u64,
    /// Author display name, `Unknown` when missing.
    pub author: String,
}

impl Worklog {
    pub(crate) fn from_raw(raw: &RawWorklog, comment: String) -> Self {
        Self {
            id: raw.id.clone(),
            comment,
            created: parse_date(raw.created.as_deref()),
            updated: parse_date(raw.updated.as_deref()),
            started: parse_date(raw.started.as_deref()),
            time_spent: raw.time_spent.clone(),
            time_spent_seconds: raw.time_spent_seconds,
            author: author_name(raw.author.as_ref()),
        }
    }
}

/// Result of logging work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddedWorklog {
    #[serde(flatten)]
    pub worklog: Worklog,
    /// Whether the issue's original estimate was changed as requested.
    pub original_estimate_updated: bool,
}
