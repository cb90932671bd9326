//! Error types for Jira comment and worklog operations.

use atl_client::ApiError;

/// Error from a Jira operation.
#[derive(Debug, thiserror::Error)]
pub enum JiraError {
    /// The server rejected the credentials.
    #[error(
        "Authentication failed for Jira API ({status}). Token may be expired or invalid. Please verify credentials."
    )]
    Authentication {
        /// HTTP status code (401 or 403).
        status: u16,
    },

    /// REST call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Response JSON did not have the expected shape.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Failure wrapped with the operation that hit it.
    #[error("{context}: {source}")]
    Context {
        /// Operation description.
        context: String,
        /// Underlying failure.
        source: Box<JiraError>,
    },
}

impl JiraError {
    /// Wrap `self` with a description of the failed operation.
    #[must_use]
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Whether this error, or the one it wraps, is an authentication failure.
    #[must_use]
    pub fn is_authentication(&self) -> bool {
        match self {
            Self::Authentication { .. } => true,
            Self::Context { source, .. } => source.is_authentication(),
            _ => false,
        }
    }
}
