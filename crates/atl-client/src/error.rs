//! Error types for the HTTP transport.

use std::path::PathBuf;
use std::str::Utf8Error;

/// Error from an Atlassian REST call.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] ureq::Error),

    /// HTTP response error (server returned error status).
    #[error("HTTP error: {status} - {body}")]
    HttpResponse {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// RSA key loading/parsing error.
    #[error("RSA key error: {0}")]
    RsaKey(#[from] RsaKeyError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL could not be parsed for request signing.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// HTTP status code, if the server answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpResponse { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the server rejected the credentials (401 or 403).
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }
}

/// RSA key loading/parsing error.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RsaKeyError {
    /// Key file could not be read.
    #[error("failed to read key file {}: {source}", path.display())]
    Read {
        /// Key file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Invalid UTF-8 in key file.
    #[error("invalid UTF-8 in key")]
    InvalidUtf8(#[from] Utf8Error),

    /// PKCS#8 key parsing error (returned when both formats fail).
    #[error("PEM key is neither PKCS#8 nor PKCS#1")]
    Pkcs8(#[from] rsa::pkcs8::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_failure_statuses() {
        for status in [401, 403] {
            let err = ApiError::HttpResponse {
                status,
                body: String::new(),
            };
            assert!(err.is_auth_failure());
            assert_eq!(err.status(), Some(status));
        }
    }

    #[test]
    fn test_other_statuses_not_auth_failure() {
        let err = ApiError::HttpResponse {
            status: 404,
            body: "Issue Does Not Exist".to_owned(),
        };
        assert!(!err.is_auth_failure());
        assert!(err.to_string().contains("404"));
        assert!(err.to_string().contains("Issue Does Not Exist"));
    }

    #[test]
    fn test_invalid_url_has_no_status() {
        let err = ApiError::InvalidUrl("::".to_owned());
        assert_eq!(err.status(), None);
        assert!(!err.is_auth_failure());
    }
}
