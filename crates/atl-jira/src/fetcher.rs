//! Comment and worklog service over a [`JiraApi`].

use atl_client::ApiError;
use atl_config::JiraConfig;
use atl_markup::{Preprocessor, TextPreprocessor};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{error, warn};

use crate::api::JiraApi;
use crate::client::JiraClient;
use crate::error::JiraError;

/// Jira comment and worklog operations.
///
/// Wraps an API client and a text preprocessor. The operations live in
/// `comments.rs` and `worklog.rs`.
pub struct JiraFetcher<A, P> {
    pub(crate) api: A,
    pub(crate) preprocessor: P,
    pub(crate) force_internal_comments: bool,
}

impl<A: JiraApi, P: TextPreprocessor> JiraFetcher<A, P> {
    /// Create a fetcher.
    ///
    /// With `force_internal_comments` every added comment is internal.
    pub fn new(api: A, preprocessor: P, force_internal_comments: bool) -> Self {
        Self {
            api,
            preprocessor,
            force_internal_comments,
        }
    }

    /// Underlying API client.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Convert markdown to Jira wiki markup.
    ///
    /// Empty text is returned as is. A failed conversion is logged and the
    /// original text is used.
    pub(crate) fn markdown_to_jira(&self, markdown: &str) -> String {
        if markdown.is_empty() {
            return String::new();
        }
        match self.preprocessor.markdown_to_jira(markdown) {
            Ok(markup) => markup,
            Err(e) => {
                warn!("Error converting markdown to Jira format: {}", e);
                markdown.to_owned()
            }
        }
    }

    pub(crate) fn clean_text(&self, text: &str) -> String {
        self.preprocessor.clean_jira_text(text)
    }
}

impl JiraFetcher<JiraClient, Preprocessor> {
    /// Create a fetcher talking to the configured Jira instance.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RsaKey`] if an OAuth private key cannot be loaded.
    pub fn from_config(config: &JiraConfig) -> Result<Self, ApiError> {
        let client = JiraClient::from_config(config)?;
        Ok(Self::new(
            client,
            Preprocessor::new(),
            config.force_internal_comments,
        ))
    }
}

/// Classify a REST failure, turning 401/403 into [`JiraError::Authentication`].
pub(crate) fn classify(err: ApiError) -> JiraError {
    match err.status() {
        Some(status) if err.is_auth_failure() => {
            let err = JiraError::Authentication { status };
            error!("{}", err);
            err
        }
        _ => JiraError::Api(err),
    }
}

/// Decode a response that must be a JSON object.
pub(crate) fn decode_object<T: DeserializeOwned>(value: Value, what: &str) -> Result<T, JiraError> {
    if !value.is_object() {
        let message = format!("{what} response is not a JSON object");
        error!("{}", message);
        return Err(JiraError::UnexpectedResponse(message));
    }
    serde_json::from_value(value)
        .map_err(|e| JiraError::UnexpectedResponse(format!("invalid {what} response: {e}")))
}
