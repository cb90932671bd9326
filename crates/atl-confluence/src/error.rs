//! Error types for Confluence page operations.

use atl_client::ApiError;

/// Error from a page operation.
#[derive(Debug, thiserror::Error)]
pub enum ConfluenceError {
    /// The server rejected the credentials.
    #[error(
        "Authentication failed for Confluence API ({status}). Token may be expired or invalid. Please verify credentials."
    )]
    Authentication {
        /// HTTP status code (401 or 403).
        status: u16,
    },

    /// REST call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Response was missing data the operation depends on.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Page creation answered without a page ID.
    #[error("Create page response did not contain an ID")]
    MissingPageId,

    /// Failure wrapped with the operation that hit it.
    #[error("{context}: {source}")]
    Context {
        /// Operation description.
        context: String,
        /// Underlying failure.
        source: Box<ConfluenceError>,
    },
}

impl ConfluenceError {
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
