//! Page operations.

use atl_markup::TextPreprocessor;
use tracing::{debug, error, info, warn};

use crate::api::{ConfluenceApi, NewPage, PageUpdate};
use crate::error::ConfluenceError;
use crate::fetcher::{ConfluenceFetcher, classify};
use crate::models::{ContentFormat, Page};
use crate::types::{RawPage, RawSpace};

/// Expansions for a full page fetch.
const CONTENT_EXPAND: &str = "body.storage,version,space,children.attachment,ancestors";

/// Expansions for a page found by title.
const TITLE_EXPAND: &str = "body.storage,version";

/// Number of spaces checked before a title lookup.
const SPACE_LOOKUP_LIMIT: u32 = 500;

/// Default page size for [`ConfluenceFetcher::get_space_pages`].
pub const DEFAULT_SPACE_PAGES_LIMIT: u32 = 10;

/// Default page size for [`ConfluenceFetcher::get_page_children`].
pub const DEFAULT_CHILDREN_LIMIT: u32 = 25;

/// Default expansions for [`ConfluenceFetcher::get_page_children`].
pub const DEFAULT_CHILDREN_EXPAND: &str = "version";

/// Options for [`ConfluenceFetcher::update_page`].
#[derive(Debug, Clone, Copy)]
pub struct UpdateOptions<'a> {
    pub minor_edit: bool,
    /// Version comment; empty for none.
    pub version_comment: &'a str,
    /// Whether the body is markdown rather than storage format.
    pub is_markdown: bool,
    /// New parent page, to move the page.
    pub parent_id: Option<&'a str>,
}

impl Default for UpdateOptions<'_> {
    fn default() -> Self {
        Self {
            minor_edit: false,
            version_comment: "",
            is_markdown: true,
            parent_id: None,
        }
    }
}

impl<A: ConfluenceApi, P: TextPreprocessor> ConfluenceFetcher<A, P> {
    /// Fetch a page with its body, version, space, attachments and ancestors.
    ///
    /// The body is returned as markdown, or as processed storage HTML when
    /// `convert_to_markdown` is false.
    ///
    /// # Errors
    ///
    /// Returns [`ConfluenceError::Authentication`] on 401/403. Other HTTP
    /// errors are returned as they are; anything else is wrapped with
    /// "Error retrieving page content".
    pub fn get_page_content(
        &self,
        page_id: &str,
        convert_to_markdown: bool,
    ) -> Result<Page, ConfluenceError> {
        let raw = self
            .api
            .get_page_by_id(page_id, CONTENT_EXPAND)
            .map_err(|e| {
                if e.status().is_some() {
                    let err = classify(e);
                    if !err.is_authentication() {
                        error!("HTTP error during API call: {}", err);
                    }
                    err
                } else {
                    content_error(page_id, ConfluenceError::Api(e))
                }
            })?;

        if raw.storage_value().is_none() {
            return Err(content_error(
                page_id,
                ConfluenceError::UnexpectedResponse(format!("page {page_id} has no storage body")),
            ));
        }

        let space_key = raw.space_key().unwrap_or_default().to_owned();
        Ok(self.processed_page(&raw, &space_key, convert_to_markdown))
    }

    /// Ancestors of a page, immediate parent first, without bodies.
    ///
    /// Failures other than authentication are logged and give an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`ConfluenceError::Authentication`] on 401/403.
    pub fn get_page_ancestors(&self, page_id: &str) -> Result<Vec<Page>, ConfluenceError> {
        match self.api.get_page_ancestors(page_id) {
            Ok(ancestors) => Ok(ancestors
                .iter()
                .rev()
                .map(|raw| self.page(raw, None, ContentFormat::Storage))
                .collect()),
            Err(e) if e.is_auth_failure() => Err(classify(e)),
            Err(e) => {
                error!("Error fetching ancestors for page {}: {}", page_id, e);
                debug!("Full error details: {:?}", e);
                Ok(Vec::new())
            }
        }
    }

    /// Find a page by exact title within a space.
    ///
    /// Returns `None` when the space or page does not exist, and also when
    /// any request fails; failures are logged.
    pub fn get_page_by_title(
        &self,
        space_key: &str,
        title: &str,
        convert_to_markdown: bool,
    ) -> Option<Page> {
        let raw = match self.find_page_by_title(space_key, title) {
            Ok(raw) => raw?,
            Err(e) => {
                error!("Error fetching page '{}' in space {}: {}", title, space_key, e);
                debug!("Full error details: {:?}", e);
                return None;
            }
        };

        if raw.storage_value().is_none() {
            error!("Missing body in page data for '{}'", title);
            return None;
        }

        Some(self.processed_page(&raw, space_key, convert_to_markdown))
    }

    fn find_page_by_title(
        &self,
        space_key: &str,
        title: &str,
    ) -> Result<Option<RawPage>, ConfluenceError> {
        let spaces = self
            .api
            .get_all_spaces(0, SPACE_LOOKUP_LIMIT)
            .map_err(classify)?
            .into_vec();
        if !spaces.iter().any(|space| space.key == space_key) {
            warn!("Space {} not found", space_key);
            return Ok(None);
        }

        let page = self
            .api
            .get_page_by_title(space_key, title, TITLE_EXPAND)
            .map_err(classify)?;
        if page.is_none() {
            warn!("Page '{}' not found in space {}", title, space_key);
        }
        Ok(page)
    }

    /// One page of the pages in a space, bodies processed.
    ///
    /// Pages without space information are attributed to `space_key`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfluenceError::Authentication`] on 401/403, other failures
    /// wrapped with the space key.
    pub fn get_space_pages(
        &self,
        space_key: &str,
        start: u32,
        limit: u32,
        convert_to_markdown: bool,
    ) -> Result<Vec<Page>, ConfluenceError> {
        let pages = self
            .api
            .get_all_pages_from_space(space_key, start, limit, "body.storage")
            .map_err(|e| {
                classify(e).context(format!("Failed to list pages in space {space_key}"))
            })?;

        Ok(pages
            .into_iter()
            .map(|mut raw| {
                if raw.space.is_none() {
                    raw.space = Some(RawSpace {
                        key: space_key.to_owned(),
                        name: space_key.to_owned(),
                    });
                }
                self.processed_page(&raw, space_key, convert_to_markdown)
            })
            .collect())
    }

    /// Create a page and return it as freshly fetched, with a markdown body.
    ///
    /// `body` is converted from markdown to storage format when `is_markdown`.
    ///
    /// # Errors
    ///
    /// Every failure is wrapped with "Failed to create page '<title>' in
    /// space <key>", including a response without a page ID.
    pub fn create_page(
        &self,
        space_key: &str,
        title: &str,
        body: &str,
        parent_id: Option<&str>,
        is_markdown: bool,
    ) -> Result<Page, ConfluenceError> {
        let fail = |err: ConfluenceError| {
            error!("Error creating page '{}' in space {}: {}", title, space_key, err);
            err.context(format!("Failed to create page '{title}' in space {space_key}"))
        };

        let storage_body = self.storage_body(body, is_markdown);
        let created = self
            .api
            .create_page(&NewPage {
                space_key,
                title,
                body: &storage_body,
                parent_id,
            })
            .map_err(|e| fail(classify(e)))?;

        if created.id.is_empty() {
            return Err(fail(ConfluenceError::MissingPageId));
        }
        info!("Created page {} '{}' in space {}", created.id, title, space_key);

        self.get_page_content(&created.id, true).map_err(fail)
    }

    /// Replace a page's title and body with a new version.
    ///
    /// The current version number is fetched first and the update is sent as
    /// the next one. Returns the page as freshly fetched, with a markdown body.
    ///
    /// # Errors
    ///
    /// Every failure is wrapped with "Failed to update page <id>".
    pub fn update_page(
        &self,
        page_id: &str,
        title: &str,
        body: &str,
        options: &UpdateOptions<'_>,
    ) -> Result<Page, ConfluenceError> {
        let fail = |err: ConfluenceError| {
            error!("Error updating page {}: {}", page_id, err);
            err.context(format!("Failed to update page {page_id}"))
        };

        let storage_body = self.storage_body(body, options.is_markdown);
        debug!("Updating page {} with title '{}'", page_id, title);

        let current = self
            .api
            .get_page_by_id(page_id, "version")
            .map_err(|e| fail(classify(e)))?;
        let version = current
            .version
            .as_ref()
            .map(|v| v.number + 1)
            .ok_or_else(|| {
                fail(ConfluenceError::UnexpectedResponse(format!(
                    "page {page_id} has no version"
                )))
            })?;

        self.api
            .update_page(&PageUpdate {
                page_id,
                title,
                body: &storage_body,
                version,
                minor_edit: options.minor_edit,
                message: options.version_comment,
                parent_id: options.parent_id,
            })
            .map_err(|e| fail(classify(e)))?;

        self.get_page_content(page_id, true).map_err(fail)
    }

    /// Direct child pages of a page.
    ///
    /// Bodies are converted to markdown only when `expand` includes the body
    /// and `convert_to_markdown` is set; otherwise whatever storage body came
    /// back is kept. Failures are logged and give an empty list.
    pub fn get_page_children(
        &self,
        page_id: &str,
        start: u32,
        limit: u32,
        expand: &str,
        convert_to_markdown: bool,
    ) -> Vec<Page> {
        let children = match self.api.get_page_children(page_id, start, limit, expand) {
            Ok(listing) => listing.into_vec(),
            Err(e) => {
                error!("Error fetching child pages for page {}: {}", page_id, e);
                debug!("Full error details: {:?}", e);
                return Vec::new();
            }
        };

        let space_key = children
            .first()
            .and_then(RawPage::space_key)
            .unwrap_or_default()
            .to_owned();
        let content_format = ContentFormat::from_flag(convert_to_markdown);

        children
            .iter()
            .map(|raw| {
                let content = match raw.storage_value() {
                    Some(storage) if convert_to_markdown && !storage.is_empty() => Some(
                        self.preprocessor
                            .process_html_content(storage, &space_key)
                            .markdown,
                    ),
                    _ => None,
                };
                self.page(raw, content, content_format)
            })
            .collect()
    }
}

fn content_error(page_id: &str, err: ConfluenceError) -> ConfluenceError {
    error!("Error retrieving page content for page ID {}: {}", page_id, err);
    err.context("Error retrieving page content")
}

#[cfg(test)]
mod tests {
    use atl_markup::Preprocessor;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::mock::{CreatedPage, MockConfluenceApi};

    const BASE: &str = "https://wiki.example.com";

    fn fetcher(api: MockConfluenceApi) -> ConfluenceFetcher<MockConfluenceApi, Preprocessor> {
        ConfluenceFetcher::new(api, Preprocessor::new().with_base_url(BASE), false)
    }

    fn runbook() -> serde_json::Value {
        json!({
            "id": "42",
            "type": "page",
            "title": "Runbook",
            "space": {"key": "OPS", "name": "Operations"},
            "version": {"number": 3, "when": "2024-03-01T09:00:00.000Z", "by": {"displayName": "Ada"}},
            "body": {"storage": {"value": "<h2>Steps</h2><p>Restart <strong>all</strong> nodes&nbsp;now</p>", "representation": "storage"}},
            "ancestors": [{"id": "1", "title": "Home"}, {"id": "7", "title": "Operations"}],
            "children": {"attachment": {"results": [{"id": "att9", "title": "topology.png"}]}}
        })
    }

    #[test]
    fn test_get_page_content_markdown() {
        let fetcher = fetcher(MockConfluenceApi::new(BASE).with_page(runbook()));

        let page = fetcher.get_page_content("42", true).unwrap();

        assert_eq!(page.title, "Runbook");
        assert_eq!(page.content, "## Steps\n\nRestart **all** nodes now");
        assert_eq!(page.content_format, ContentFormat::Markdown);
        assert_eq!(page.version, Some(3));
        assert_eq!(page.author.as_deref(), Some("Ada"));
        assert_eq!(page.attachments, vec!["topology.png"]);
        assert_eq!(
            page.ancestors.iter().map(|a| a.id.as_str()).collect::<Vec<_>>(),
            vec!["7", "1"]
        );
        assert_eq!(
            page.url.as_deref(),
            Some("https://wiki.example.com/pages/viewpage.action?pageId=42")
        );
        assert_eq!(
            fetcher.api().calls(),
            vec!["get_page_by_id(42, body.storage,version,space,children.attachment,ancestors)"]
        );
    }

    #[test]
    fn test_get_page_content_storage() {
        let fetcher = fetcher(MockConfluenceApi::new(BASE).with_page(runbook()));

        let page = fetcher.get_page_content("42", false).unwrap();

        assert_eq!(page.content_format, ContentFormat::Storage);
        assert_eq!(
            page.content,
            "<h2>Steps</h2><p>Restart <strong>all</strong> nodes\u{00a0}now</p>"
        );
    }

    #[test]
    fn test_get_page_content_cloud_url() {
        let api = MockConfluenceApi::new("https://acme.atlassian.net/wiki").with_page(runbook());
        let fetcher = ConfluenceFetcher::new(api, Preprocessor::new(), true);

        let page = fetcher.get_page_content("42", true).unwrap();

        assert_eq!(
            page.url.as_deref(),
            Some("https://acme.atlassian.net/wiki/spaces/OPS/pages/42")
        );
    }

    #[test]
    fn test_get_page_content_auth_failure() {
        let fetcher = fetcher(MockConfluenceApi::new(BASE).failing(401));

        let err = fetcher.get_page_content("42", true).unwrap_err();

        assert!(matches!(err, ConfluenceError::Authentication { status: 401 }));
        assert_eq!(
            err.to_string(),
            "Authentication failed for Confluence API (401). Token may be expired or invalid. Please verify credentials."
        );
    }

    #[test]
    fn test_get_page_content_http_error_passed_through() {
        let fetcher = fetcher(MockConfluenceApi::new(BASE));

        let err = fetcher.get_page_content("404404", true).unwrap_err();

        assert!(matches!(&err, ConfluenceError::Api(api) if api.status() == Some(404)));
    }

    #[test]
    fn test_get_page_content_without_body() {
        let fetcher = fetcher(
            MockConfluenceApi::new(BASE).with_page(json!({"id": "5", "title": "Empty"})),
        );

        let err = fetcher.get_page_content("5", true).unwrap_err();

        assert!(
            err.to_string()
                .starts_with("Error retrieving page content: unexpected response")
        );
    }

    #[test]
    fn test_get_page_ancestors_parent_first() {
        let fetcher = fetcher(MockConfluenceApi::new(BASE).with_page(runbook()));

        let ancestors = fetcher.get_page_ancestors("42").unwrap();

        let titles: Vec<_> = ancestors.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Operations", "Home"]);
        assert!(ancestors.iter().all(|p| p.content.is_empty()));
    }

    #[test]
    fn test_get_page_ancestors_auth_failure_propagates() {
        let fetcher = fetcher(MockConfluenceApi::new(BASE).failing(403));

        let err = fetcher.get_page_ancestors("42").unwrap_err();

        assert!(err.is_authentication());
    }

    #[test]
    fn test_get_page_ancestors_other_failure_is_empty() {
        let fetcher = fetcher(MockConfluenceApi::new(BASE).failing(500));

        assert!(fetcher.get_page_ancestors("42").unwrap().is_empty());
    }

    #[test]
    fn test_get_page_by_title() {
        let fetcher = fetcher(
            MockConfluenceApi::new(BASE)
                .with_space("OPS", "Operations")
                .with_page(runbook()),
        );

        let page = fetcher.get_page_by_title("OPS", "Runbook", true).unwrap();

        assert_eq!(page.id, "42");
        assert_eq!(page.content, "## Steps\n\nRestart **all** nodes now");
        assert_eq!(
            fetcher.api().calls(),
            vec![
                "get_all_spaces(0, 500)",
                "get_page_by_title(OPS, Runbook, body.storage,version)"
            ]
        );
    }

    #[test]
    fn test_get_page_by_title_unknown_space() {
        let fetcher = fetcher(
            MockConfluenceApi::new(BASE)
                .with_space("DOC", "Docs")
                .with_page(runbook()),
        );

        assert_eq!(fetcher.get_page_by_title("OPS", "Runbook", true), None);
        assert_eq!(fetcher.api().calls(), vec!["get_all_spaces(0, 500)"]);
    }

    #[test]
    fn test_get_page_by_title_missing_page() {
        let fetcher = fetcher(MockConfluenceApi::new(BASE).with_space("OPS", "Operations"));

        assert_eq!(fetcher.get_page_by_title("OPS", "Nope", true), None);
    }

    #[test]
    fn test_get_page_by_title_swallows_errors() {
        let fetcher = fetcher(MockConfluenceApi::new(BASE).failing(401));

        assert_eq!(fetcher.get_page_by_title("OPS", "Runbook", true), None);
    }

    #[test]
    fn test_get_space_pages_fills_missing_space() {
        let fetcher = fetcher(
            MockConfluenceApi::new(BASE)
                .with_page(json!({
                    "id": "1",
                    "title": "One",
                    "body": {"storage": {"value": "<p>first</p>"}}
                }))
                .with_page(json!({
                    "id": "2",
                    "title": "Two",
                    "body": {"storage": {"value": "<p>second</p>"}}
                })),
        );

        let pages = fetcher.get_space_pages("DOC", 0, 10, true).unwrap();

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].content, "first");
        assert_eq!(
            pages[1].space.as_ref().map(|s| (s.key.as_str(), s.name.as_str())),
            Some(("DOC", "DOC"))
        );
        assert_eq!(
            fetcher.api().calls(),
            vec!["get_all_pages_from_space(DOC, 0, 10, body.storage)"]
        );
    }

    #[test]
    fn test_get_space_pages_pagination() {
        let mut api = MockConfluenceApi::new(BASE);
        for id in 1..=4 {
            api = api.with_page(json!({"id": id.to_string(), "title": format!("P{id}")}));
        }
        let fetcher = fetcher(api);

        let pages = fetcher.get_space_pages("DOC", 1, 2, false).unwrap();

        let ids: Vec<_> = pages.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
    }

    #[test]
    fn test_get_space_pages_error_propagates() {
        let fetcher = fetcher(MockConfluenceApi::new(BASE).failing(500));

        let err = fetcher.get_space_pages("DOC", 0, 10, true).unwrap_err();

        assert!(err.to_string().starts_with("Failed to list pages in space DOC: HTTP error: 500"));
    }

    #[test]
    fn test_create_page_converts_markdown() {
        let fetcher = fetcher(
            MockConfluenceApi::new(BASE)
                .with_page(json!({"id": "7", "title": "Operations", "space": {"key": "OPS"}})),
        );

        let page = fetcher
            .create_page("OPS", "Deploy", "# Deploy\n\nShip it", Some("7"), true)
            .unwrap();

        assert_eq!(
            fetcher.api().created(),
            vec![CreatedPage {
                space_key: "OPS".to_owned(),
                title: "Deploy".to_owned(),
                body: "<h1>Deploy</h1><p>Ship it</p>".to_owned(),
                parent_id: Some("7".to_owned()),
            }]
        );
        assert_eq!(page.title, "Deploy");
        assert_eq!(page.content, "# Deploy\n\nShip it");
        assert_eq!(page.ancestors[0].title, "Operations");
    }

    #[test]
    fn test_create_page_storage_body_sent_as_is() {
        let fetcher = fetcher(MockConfluenceApi::new(BASE));

        fetcher
            .create_page("OPS", "Raw", "<p>**kept**</p>", None, false)
            .unwrap();

        assert_eq!(fetcher.api().created()[0].body, "<p>**kept**</p>");
    }

    #[test]
    fn test_create_page_missing_id() {
        let fetcher = fetcher(MockConfluenceApi::new(BASE).without_created_id());

        let err = fetcher
            .create_page("OPS", "Deploy", "body", None, true)
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Failed to create page 'Deploy' in space OPS: Create page response did not contain an ID"
        );
    }

    #[test]
    fn test_create_page_error_wrapped() {
        let fetcher = fetcher(MockConfluenceApi::new(BASE).with_failure("create_page", 400));

        let err = fetcher
            .create_page("OPS", "Deploy", "body", None, true)
            .unwrap_err();

        assert!(
            err.to_string()
                .starts_with("Failed to create page 'Deploy' in space OPS: HTTP error: 400")
        );
    }

    #[test]
    fn test_update_page_bumps_version() {
        let fetcher = fetcher(MockConfluenceApi::new(BASE).with_page(runbook()));

        let page = fetcher
            .update_page(
                "42",
                "Runbook v2",
                "Restart *one* node",
                &UpdateOptions {
                    minor_edit: true,
                    version_comment: "narrow scope",
                    ..UpdateOptions::default()
                },
            )
            .unwrap();

        let updates = fetcher.api().updated();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].version, 4);
        assert!(updates[0].minor_edit);
        assert_eq!(updates[0].message, "narrow scope");
        assert_eq!(updates[0].body, "<p>Restart <em>one</em> node</p>");
        assert_eq!(page.title, "Runbook v2");
        assert_eq!(page.version, Some(4));
        assert_eq!(page.content, "Restart *one* node");
    }

    #[test]
    fn test_update_page_missing_page() {
        let fetcher = fetcher(MockConfluenceApi::new(BASE));

        let err = fetcher
            .update_page("9", "T", "b", &UpdateOptions::default())
            .unwrap_err();

        assert!(err.to_string().starts_with("Failed to update page 9: HTTP error: 404"));
        assert!(fetcher.api().updated().is_empty());
    }

    #[test]
    fn test_update_page_without_version() {
        let mut page = runbook();
        page.as_object_mut().unwrap().remove("version");
        let fetcher = fetcher(MockConfluenceApi::new(BASE).with_page(page));

        let err = fetcher
            .update_page("42", "T", "b", &UpdateOptions::default())
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Failed to update page 42: unexpected response: page 42 has no version"
        );
        assert!(fetcher.api().updated().is_empty());
    }

    #[test]
    fn test_update_page_auth_failure_is_detectable() {
        let fetcher = fetcher(MockConfluenceApi::new(BASE).with_page(runbook()).failing(401));

        let err = fetcher
            .update_page("42", "T", "b", &UpdateOptions::default())
            .unwrap_err();

        assert!(err.is_authentication());
    }

    #[test]
    fn test_get_page_children_envelope() {
        let fetcher = fetcher(MockConfluenceApi::new(BASE).with_children(
            "42",
            json!({
                "results": [
                    {"id": "100", "title": "Child A", "space": {"key": "OPS"}, "version": {"number": 2}},
                    {"id": "101", "title": "Child B"}
                ],
                "start": 0,
                "limit": 25,
                "size": 2
            }),
        ));

        let children = fetcher.get_page_children("42", 0, 25, "version", true);

        assert_eq!(children.len(), 2);
        assert_eq!(children[0].version, Some(2));
        assert!(children[0].content.is_empty());
        assert_eq!(children[1].title, "Child B");
    }

    #[test]
    fn test_get_page_children_converts_expanded_body() {
        let fetcher = fetcher(MockConfluenceApi::new(BASE).with_children(
            "42",
            json!([
                {"id": "100", "title": "Child", "space": {"key": "OPS"},
                 "body": {"storage": {"value": "<p><em>hi</em></p>"}}}
            ]),
        ));

        let markdown = fetcher.get_page_children("42", 0, 25, "body.storage", true);
        let storage = fetcher.get_page_children("42", 0, 25, "body.storage", false);

        assert_eq!(markdown[0].content, "*hi*");
        assert_eq!(markdown[0].content_format, ContentFormat::Markdown);
        assert_eq!(storage[0].content, "<p><em>hi</em></p>");
        assert_eq!(storage[0].content_format, ContentFormat::Storage);
    }

    #[test]
    fn test_get_page_children_failure_is_empty() {
        let fetcher = fetcher(MockConfluenceApi::new(BASE).failing(401));

        assert!(fetcher.get_page_children("42", 0, 25, "version", true).is_empty());
    }
}
