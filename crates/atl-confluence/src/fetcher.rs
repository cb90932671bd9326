//! Page service over a [`ConfluenceApi`].

use atl_client::ApiError;
use atl_config::ConfluenceConfig;
use atl_markup::{Preprocessor, TextPreprocessor};
use tracing::error;

use crate::api::ConfluenceApi;
use crate::client::ConfluenceClient;
use crate::error::ConfluenceError;
use crate::models::{ContentFormat, Page, PageBuild};
use crate::types::RawPage;

/// Confluence page operations.
///
/// Wraps an API client and a text preprocessor; every call performs its
/// requests synchronously and maps the responses into [`Page`] records.
/// The operations themselves live in `pages.rs`.
pub struct ConfluenceFetcher<A, P> {
    pub(crate) api: A,
    pub(crate) preprocessor: P,
    is_cloud: bool,
}

impl<A: ConfluenceApi, P: TextPreprocessor> ConfluenceFetcher<A, P> {
    /// Create a fetcher.
    ///
    /// `is_cloud` selects the page URL scheme used when the API does not
    /// return a web UI link.
    pub fn new(api: A, preprocessor: P, is_cloud: bool) -> Self {
        Self {
            api,
            preprocessor,
            is_cloud,
        }
    }

    /// Underlying API client.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Build a page record, keeping the raw storage body unless `content` is given.
    pub(crate) fn page(
        &self,
        raw: &RawPage,
        content: Option<String>,
        content_format: ContentFormat,
    ) -> Page {
        Page::from_raw(
            raw,
            PageBuild {
                base_url: self.api.base_url(),
                is_cloud: self.is_cloud,
                content,
                content_format,
            },
        )
    }

    /// Build a page record with its storage body run through the preprocessor.
    pub(crate) fn processed_page(
        &self,
        raw: &RawPage,
        space_key: &str,
        convert_to_markdown: bool,
    ) -> Page {
        let processed = self
            .preprocessor
            .process_html_content(raw.storage_value().unwrap_or_default(), space_key);
        let content = if convert_to_markdown {
            processed.markdown
        } else {
            processed.html
        };
        self.page(
            raw,
            Some(content),
            ContentFormat::from_flag(convert_to_markdown),
        )
    }

    /// Storage body for a create or update call.
    pub(crate) fn storage_body(&self, body: &str, is_markdown: bool) -> String {
        if is_markdown {
            self.preprocessor.markdown_to_confluence_storage(body)
        } else {
            body.to_owned()
        }
    }
}

impl ConfluenceFetcher<ConfluenceClient, Preprocessor> {
    /// Create a fetcher talking to the configured Confluence instance.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RsaKey`] if an OAuth private key cannot be loaded.
    pub fn from_config(config: &ConfluenceConfig) -> Result<Self, ApiError> {
        let client = ConfluenceClient::from_config(config)?;
        let preprocessor = Preprocessor::new().with_base_url(&config.url);
        Ok(Self::new(client, preprocessor, config.is_cloud()))
    }
}

/// Classify a REST failure, turning 401/403 into [`ConfluenceError::Authentication`].
pub(crate) fn classify(err: ApiError) -> ConfluenceError {
    match err.status() {
        Some(status) if err.is_auth_failure() => {
            let err = ConfluenceError::Authentication { status };
            error!("{}", err);
            err
        }
        _ => ConfluenceError::Api(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_auth_failure() {
        let err = classify(ApiError::HttpResponse {
            status: 403,
            body: String::new(),
        });
        assert!(matches!(err, ConfluenceError::Authentication { status: 403 }));
    }

    #[test]
    fn test_classify_other_status() {
        let err = classify(ApiError::HttpResponse {
            status: 500,
            body: "boom".to_owned(),
        });
        assert!(matches!(err, ConfluenceError::Api(_)));
        assert!(!err.is_authentication());
    }
}
