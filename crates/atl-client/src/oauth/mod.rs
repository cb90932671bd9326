//! OAuth 1.0 RSA-SHA1 request signing.
//!
//! Server/Data Center instances linked through an application link accept
//! requests signed with the consumer's RSA key.

pub(crate) mod key;
mod signature;

use percent_encoding::percent_decode_str;
use rsa::RsaPrivateKey;
use ureq::http::Uri;

use crate::error::ApiError;
use signature::create_authorization_header;

/// OAuth 1.0 RSA-SHA1 credentials.
pub struct OAuth1Auth {
    consumer_key: String,
    private_key: RsaPrivateKey,
    access_token: String,
}

impl OAuth1Auth {
    /// Create auth instance with pre-loaded private key.
    pub(crate) fn new(consumer_key: &str, private_key: RsaPrivateKey, access_token: &str) -> Self {
        Self {
            consumer_key: consumer_key.to_owned(),
            private_key,
            access_token: access_token.to_owned(),
        }
    }

    /// Compute the `Authorization` header value for a request.
    pub(crate) fn sign(&self, method: &str, url: &str) -> Result<String, ApiError> {
        let uri: Uri = url
            .parse()
            .map_err(|_| ApiError::InvalidUrl(url.to_owned()))?;

        // Base URL excludes query string (RFC 5849 Section 3.4.1.2)
        let base_url = format!(
            "{}://{}{}",
            uri.scheme_str().unwrap_or("https"),
            uri.authority().map_or("", |a| a.as_str()),
            uri.path()
        );

        let query_params = uri.query().map(decode_query).unwrap_or_default();

        Ok(create_authorization_header(
            method,
            &base_url,
            &query_params,
            &self.consumer_key,
            &self.access_token,
            &self.private_key,
        ))
    }
}

/// Split a raw query string into percent-decoded pairs.
fn decode_query(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|param| !param.is_empty())
        .map(|param| {
            let (key, value) = param.split_once('=').unwrap_or((param, ""));
            (decode(key), decode(value))
        })
        .collect()
}

fn decode(component: &str) -> String {
    percent_decode_str(&component.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}
