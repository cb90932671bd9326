//! OAuth 1.0 signature generation (RFC 5849).

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_encode};
use rand::RngExt;
use rsa::RsaPrivateKey;
use rsa::pkcs1v15::SigningKey;
use rsa::signature::{SignatureEncoding, Signer};
use sha1::Sha1;

/// OAuth unreserved characters: A-Z a-z 0-9 - . _ ~
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode string per RFC 3986.
fn oauth_encode(input: &str) -> String {
    percent_encode(input.as_bytes(), OAUTH_ENCODE_SET).to_string()
}

/// Random nonce, 32 hex characters.
fn generate_nonce() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    hex::encode(bytes)
}

/// Seconds since the Unix epoch.
fn generate_timestamp() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
        .to_string()
}

/// Sign data with RSA-SHA1 and return base64-encoded signature.
fn sign_rsa_sha1(private_key: &RsaPrivateKey, data: &str) -> String {
    let signing_key = SigningKey::<Sha1>::new(private_key.clone());
    let signature = signing_key.sign(data.as_bytes());
    BASE64_STANDARD.encode(signature.to_bytes())
}

/// Build OAuth signature base string per RFC 5849 Section 3.4.1.
///
/// Format: `HTTP_METHOD&encoded_base_url&encoded_parameters`
fn build_signature_base_string(
    method: &str,
    base_url: &str,
    params: &BTreeMap<String, String>,
) -> String {
    let param_string = params
        .iter()
        .map(|(k, v)| format!("{}={}", oauth_encode(k), oauth_encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        oauth_encode(base_url),
        oauth_encode(&param_string)
    )
}

/// Build OAuth Authorization header from OAuth params.
fn build_authorization_header(oauth_params: &BTreeMap<String, String>) -> String {
    let header_parts: Vec<String> = oauth_params
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, oauth_encode(v)))
        .collect();
    format!("OAuth {}", header_parts.join(", "))
}

/// Create OAuth Authorization header value.
///
/// `query_params` must already be percent-decoded; they are re-encoded
/// uniformly while building the signature base string.
pub(super) fn create_authorization_header(
    method: &str,
    base_url: &str,
    query_params: &[(String, String)],
    consumer_key: &str,
    access_token: &str,
    private_key: &RsaPrivateKey,
) -> String {
    let mut oauth_params = BTreeMap::new();
    oauth_params.insert("oauth_consumer_key".to_owned(), consumer_key.to_owned());
    oauth_params.insert("oauth_nonce".to_owned(), generate_nonce());
    oauth_params.insert("oauth_signature_method".to_owned(), "RSA-SHA1".to_owned());
    oauth_params.insert("oauth_timestamp".to_owned(), generate_timestamp());
    oauth_params.insert("oauth_token".to_owned(), access_token.to_owned());
    oauth_params.insert("oauth_version".to_owned(), "1.0".to_owned());

    // Query parameters take part in the signature (RFC 5849 Section 3.4.1.3)
    let mut signature_params = oauth_params.clone();
    for (key, value) in query_params {
        signature_params.insert(key.clone(), value.clone());
    }

    let base_string = build_signature_base_string(method, base_url, &signature_params);
    let signature = sign_rsa_sha1(private_key, &base_string);
    oauth_params.insert("oauth_signature".to_owned(), signature);

    build_authorization_header(&oauth_params)
}
