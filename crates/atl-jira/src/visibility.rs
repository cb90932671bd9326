//! Comment visibility resolution.

use serde::Serialize;

/// Audience of a Jira Service Management comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Visible to customers.
    Public,
    /// Visible to agents only.
    Internal,
}

/// Decide whether a new comment is public or internal.
///
/// `force_internal` wins over everything, including an explicit `"public"`.
/// Otherwise no value means public, and the value is matched
/// case-insensitively. Unrecognized values resolve to internal.
pub fn resolve_visibility(visibility: Option<&str>, force_internal: bool) -> Visibility {
    if force_internal {
        return Visibility::Internal;
    }
    match visibility {
        None => Visibility::Public,
        Some(value) if value.eq_ignore_ascii_case("public") => Visibility::Public,
        Some(_) => Visibility::Internal,
    }
}
