//! Authentication schemes for Atlassian REST APIs.

use std::fmt;

use atl_config::AuthConfig;
use base64::Engine;
use base64::prelude::BASE64_STANDARD;

use crate::error::ApiError;
use crate::oauth::OAuth1Auth;
use crate::oauth::key::load_private_key_from_file;

/// Credentials attached to every request.
pub enum Auth {
    /// HTTP Basic with username and API token.
    Basic {
        /// Pre-encoded `username:token`.
        encoded: String,
    },
    /// Personal access token sent as a bearer token.
    Bearer(String),
    /// OAuth 1.0 RSA-SHA1 signed requests.
    OAuth1(Box<OAuth1Auth>),
}

impl Auth {
    /// Basic auth from username and API token.
    #[must_use]
    pub fn basic(username: &str, api_token: &str) -> Self {
        Self::Basic {
            encoded: BASE64_STANDARD.encode(format!("{username}:{api_token}")),
        }
    }

    /// Bearer auth from a personal access token.
    #[must_use]
    pub fn bearer(token: &str) -> Self {
        Self::Bearer(token.to_owned())
    }

    /// Build credentials from a config section.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RsaKey`] if the OAuth key file cannot be loaded.
    pub fn from_config(config: &AuthConfig) -> Result<Self, ApiError> {
        Ok(match config {
            AuthConfig::Basic {
                username,
                api_token,
            } => Self::basic(username, api_token),
            AuthConfig::Token { personal_token } => Self::bearer(personal_token),
            AuthConfig::Oauth1 {
                consumer_key,
                key_file,
                access_token,
            } => {
                let private_key = load_private_key_from_file(key_file)?;
                Self::OAuth1(Box::new(OAuth1Auth::new(
                    consumer_key,
                    private_key,
                    access_token,
                )))
            }
        })
    }

    /// `Authorization` header value for a request.
    pub(crate) fn header(&self, method: &str, url: &str) -> Result<String, ApiError> {
        match self {
            Self::Basic { encoded } => Ok(format!("Basic {encoded}")),
            Self::Bearer(token) => Ok(format!("Bearer {token}")),
            Self::OAuth1(oauth) => oauth.sign(method, url),
        }
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scheme = match self {
            Self::Basic { .. } => "Basic",
            Self::Bearer(_) => "Bearer",
            Self::OAuth1(_) => "OAuth1",
        };
        f.debug_tuple("Auth").field(&scheme).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_basic_header() {
        let auth = Auth::basic("me@acme.com", "token");
        let header = auth.header("GET", "https://acme.atlassian.net").unwrap();
        assert_eq!(header, "Basic bWVAYWNtZS5jb206dG9rZW4=");
    }

    #[test]
    fn test_bearer_header() {
        let auth = Auth::bearer("pat-123");
        assert_eq!(
            auth.header("POST", "https://jira.example.com").unwrap(),
            "Bearer pat-123"
        );
    }

    #[test]
    fn test_from_config_token() {
        let auth = Auth::from_config(&AuthConfig::Token {
            personal_token: "pat".to_owned(),
        })
        .unwrap();
        assert!(matches!(auth, Auth::Bearer(ref t) if t == "pat"));
    }

    #[test]
    fn test_from_config_oauth_missing_key() {
        let err = Auth::from_config(&AuthConfig::Oauth1 {
            consumer_key: "atl".to_owned(),
            key_file: PathBuf::from("/nonexistent/key.pem"),
            access_token: "tok".to_owned(),
        })
        .unwrap_err();
        assert!(matches!(err, ApiError::RsaKey(_)));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let auth = Auth::basic("me", "super-secret");
        let debug = format!("{auth:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("Basic"));
    }
}
