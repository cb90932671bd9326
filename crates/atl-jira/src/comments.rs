//! Comment operations.

use atl_client::encode_component;
use atl_markup::TextPreprocessor;
use serde_json::{Value, json};
use tracing::{error, info};

use crate::api::JiraApi;
use crate::error::JiraError;
use crate::fetcher::{JiraFetcher, classify, decode_object};
use crate::models::Comment;
use crate::types::{PUBLIC_COMMENT_PROPERTY, RawComment, RawCommentPage};
use crate::visibility::{Visibility, resolve_visibility};

/// Default number of comments returned by [`JiraFetcher::get_issue_comments`].
pub const DEFAULT_COMMENT_LIMIT: usize = 50;

impl<A: JiraApi, P: TextPreprocessor> JiraFetcher<A, P> {
    /// First `limit` comments of an issue, bodies converted to readable text.
    ///
    /// # Errors
    ///
    /// Every failure is wrapped with "Error getting comments"; 401/403
    /// responses are [`JiraError::Authentication`] underneath.
    pub fn get_issue_comments(
        &self,
        issue_key: &str,
        limit: usize,
    ) -> Result<Vec<Comment>, JiraError> {
        self.fetch_comments(issue_key, limit).map_err(|err| {
            error!("Error getting comments for issue {}: {}", issue_key, err);
            err.context("Error getting comments")
        })
    }

    fn fetch_comments(&self, issue_key: &str, limit: usize) -> Result<Vec<Comment>, JiraError> {
        let response = self
            .api
            .issue_get_comments(issue_key)
            .map_err(classify)?;
        let page: RawCommentPage = decode_object(response, "comments")?;

        Ok(page
            .comments
            .iter()
            .take(limit)
            .map(|raw| Comment::from_raw(raw, self.clean_text(&raw.body)))
            .collect())
    }

    /// Add a markdown comment to an issue.
    ///
    /// Visibility follows [`resolve_visibility`] with the fetcher's
    /// force-internal setting. Internal comments are posted with the
    /// `sd.public.comment` property set to `{"internal": true}`.
    ///
    /// # Errors
    ///
    /// Every failure is wrapped with "Error adding comment", including a
    /// response that is not a JSON object.
    pub fn add_comment(
        &self,
        issue_key: &str,
        comment: &str,
        visibility: Option<&str>,
    ) -> Result<Comment, JiraError> {
        self.post_comment(issue_key, comment, visibility)
            .map_err(|err| {
                error!("Error adding comment to issue {}: {}", issue_key, err);
                err.context("Error adding comment")
            })
    }

    fn post_comment(
        &self,
        issue_key: &str,
        comment: &str,
        visibility: Option<&str>,
    ) -> Result<Comment, JiraError> {
        let body = self.markdown_to_jira(comment);
        let visibility = resolve_visibility(visibility, self.force_internal_comments);

        let response = match visibility {
            Visibility::Internal => {
                info!("Adding internal comment to issue {}", issue_key);
                let url = format!(
                    "{}/{}/comment",
                    self.api.resource_url("issue"),
                    encode_component(issue_key)
                );
                self.api.post(&url, &internal_comment_payload(&body))
            }
            Visibility::Public => self.api.issue_add_comment(issue_key, &body),
        }
        .map_err(classify)?;

        let raw: RawComment = decode_object(response, "comment")?;
        Ok(Comment {
            visibility: Some(visibility),
            ..Comment::from_raw(&raw, self.clean_text(&raw.body))
        })
    }
}

fn internal_comment_payload(body: &str) -> Value {
    json!({
        "body": body,
        "properties": [
            {"key": PUBLIC_COMMENT_PROPERTY, "value": {"internal": true}}
        ]
    })
}

#[cfg(test)]
mod tests {
    use std::sync::RwLock;

    use atl_markup::{MarkupError, Preprocessor, ProcessedContent};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::mock::{MOCK_AUTHOR, MockJiraApi};

    const BASE: &str = "https://jira.example.com";

    fn fetcher(api: MockJiraApi, force_internal: bool) -> JiraFetcher<MockJiraApi, Preprocessor> {
        JiraFetcher::new(api, Preprocessor::new(), force_internal)
    }

    fn three_comments() -> Value {
        json!({
            "startAt": 0,
            "maxResults": 50,
            "total": 3,
            "comments": [
                {
                    "id": "10001",
                    "body": "First *comment*",
                    "created": "2024-01-01T10:00:00.000+0000",
                    "updated": "2024-01-01T11:00:00.000+0000",
                    "author": {"displayName": "John Doe"}
                },
                {
                    "id": "10002",
                    "body": "Ping [~accountid:5b10ac8d]",
                    "created": "2024-01-02T10:00:00.000+0000",
                    "author": {"displayName": "Jane Roe"},
                    "properties": [{"key": "sd.public.comment", "value": {"internal": true}}]
                },
                {
                    "id": "10003",
                    "body": "Third",
                    "created": "2024-01-03T10:00:00.000+0000",
                    "author": {"name": "bot"}
                }
            ]
        })
    }

    /// Preprocessor that records conversions and can be told to fail them.
    struct RecordingPreprocessor {
        fail: bool,
        converted: RwLock<Vec<String>>,
    }

    impl RecordingPreprocessor {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                converted: RwLock::new(Vec::new()),
            }
        }
    }

    impl TextPreprocessor for RecordingPreprocessor {
        fn process_html_content(&self, html: &str, _space_key: &str) -> ProcessedContent {
            ProcessedContent {
                html: html.to_owned(),
                markdown: html.to_owned(),
            }
        }

        fn markdown_to_confluence_storage(&self, markdown: &str) -> String {
            markdown.to_owned()
        }

        fn markdown_to_jira(&self, markdown: &str) -> Result<String, MarkupError> {
            self.converted.write().unwrap().push(markdown.to_owned());
            if self.fail {
                return Err(MarkupError::Conversion("unsupported construct".to_owned()));
            }
            Ok(format!("converted: {markdown}"))
        }

        fn clean_jira_text(&self, text: &str) -> String {
            text.to_owned()
        }
    }

    #[test]
    fn test_get_issue_comments() {
        let fetcher = fetcher(MockJiraApi::new(BASE).with_comments("PROJ-1", three_comments()), false);

        let comments = fetcher.get_issue_comments("PROJ-1", DEFAULT_COMMENT_LIMIT).unwrap();

        assert_eq!(comments.len(), 3);
        assert_eq!(comments[0].id, "10001");
        assert_eq!(comments[0].body, "First **comment**");
        assert_eq!(comments[0].author, "John Doe");
        assert_eq!(
            comments[0].created.map(|d| d.to_rfc3339()).as_deref(),
            Some("2024-01-01T10:00:00+00:00")
        );
        assert_eq!(comments[0].visibility, None);
        assert_eq!(comments[1].body, "Ping @5b10ac8d");
        assert_eq!(comments[1].visibility, Some(Visibility::Internal));
        assert_eq!(comments[2].author, "Unknown");
    }

    #[test]
    fn test_get_issue_comments_limit() {
        let fetcher = fetcher(MockJiraApi::new(BASE).with_comments("PROJ-1", three_comments()), false);

        let comments = fetcher.get_issue_comments("PROJ-1", 2).unwrap();

        let ids: Vec<_> = comments.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["10001", "10002"]);
    }

    #[test]
    fn test_get_issue_comments_missing_fields() {
        let fetcher = fetcher(
            MockJiraApi::new(BASE).with_comments("PROJ-1", json!({"comments": [{"id": "10001"}]})),
            false,
        );

        let comments = fetcher.get_issue_comments("PROJ-1", 50).unwrap();

        assert_eq!(comments[0].body, "");
        assert_eq!(comments[0].author, "Unknown");
        assert_eq!(comments[0].created, None);
    }

    #[test]
    fn test_get_issue_comments_null_fields() {
        let fetcher = fetcher(
            MockJiraApi::new(BASE).with_comments(
                "PROJ-1",
                json!({"comments": [
                    {"id": "1", "body": "ok"},
                    {"id": "2", "body": null, "author": null, "properties": null}
                ]}),
            ),
            false,
        );

        let comments = fetcher.get_issue_comments("PROJ-1", 50).unwrap();

        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].body, "ok");
        assert_eq!(comments[1].body, "");
        assert_eq!(comments[1].author, "Unknown");
        assert_eq!(comments[1].visibility, None);
    }

    #[test]
    fn test_get_issue_comments_empty_response() {
        let fetcher = fetcher(MockJiraApi::new(BASE).with_comments("PROJ-1", json!({})), false);

        assert!(fetcher.get_issue_comments("PROJ-1", 50).unwrap().is_empty());
    }

    #[test]
    fn test_get_issue_comments_non_object_response() {
        let fetcher = fetcher(MockJiraApi::new(BASE).with_comments("PROJ-1", json!("oops")), false);

        let err = fetcher.get_issue_comments("PROJ-1", 50).unwrap_err();

        assert_eq!(
            err.to_string(),
            "Error getting comments: unexpected response: comments response is not a JSON object"
        );
    }

    #[test]
    fn test_get_issue_comments_error() {
        let fetcher = fetcher(MockJiraApi::new(BASE).failing(404), false);

        let err = fetcher.get_issue_comments("PROJ-1", 50).unwrap_err();

        assert!(err.to_string().starts_with("Error getting comments: HTTP error: 404"));
        assert!(!err.is_authentication());
    }

    #[test]
    fn test_get_issue_comments_auth_error() {
        let fetcher = fetcher(MockJiraApi::new(BASE).failing(401), false);

        let err = fetcher.get_issue_comments("PROJ-1", 50).unwrap_err();

        assert!(err.is_authentication());
    }

    #[test]
    fn test_add_public_comment() {
        let fetcher = fetcher(MockJiraApi::new(BASE), false);

        let comment = fetcher
            .add_comment("PROJ-1", "This is **done**", None)
            .unwrap();

        let requests = fetcher.api().requests_to("issue_add_comment");
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].target, "PROJ-1");
        assert_eq!(
            requests[0].payload,
            Some(json!({"body": "This is *done*"}))
        );
        assert!(fetcher.api().requests_to("post").is_empty());
        assert_eq!(comment.body, "This is **done**");
        assert_eq!(comment.author, MOCK_AUTHOR);
        assert_eq!(comment.visibility, Some(Visibility::Public));
    }

    #[test]
    fn test_add_internal_comment() {
        let fetcher = fetcher(MockJiraApi::new(BASE), false);

        let comment = fetcher
            .add_comment("PROJ-1", "Agents only", Some("INTERNAL"))
            .unwrap();

        let posts = fetcher.api().requests_to("post");
        assert_eq!(posts.len(), 1);
        assert_eq!(
            posts[0].target,
            "https://jira.example.com/rest/api/2/issue/PROJ-1/comment"
        );
        assert_eq!(
            posts[0].payload,
            Some(json!({
                "body": "Agents only",
                "properties": [{"key": "sd.public.comment", "value": {"internal": true}}]
            }))
        );
        assert!(fetcher.api().requests_to("issue_add_comment").is_empty());
        assert_eq!(comment.visibility, Some(Visibility::Internal));
    }

    #[test]
    fn test_force_internal_overrides_public() {
        let fetcher = fetcher(MockJiraApi::new(BASE), true);

        fetcher
            .add_comment("PROJ-1", "Forced", Some("public"))
            .unwrap();

        assert_eq!(fetcher.api().requests_to("post").len(), 1);
        assert!(fetcher.api().requests_to("issue_add_comment").is_empty());
    }

    #[test]
    fn test_unknown_visibility_is_internal() {
        let fetcher = fetcher(MockJiraApi::new(BASE), false);

        let comment = fetcher
            .add_comment("PROJ-1", "Hmm", Some("team"))
            .unwrap();

        assert_eq!(comment.visibility, Some(Visibility::Internal));
        assert_eq!(fetcher.api().requests_to("post").len(), 1);
    }

    #[test]
    fn test_empty_comment_not_converted() {
        let fetcher = JiraFetcher::new(MockJiraApi::new(BASE), RecordingPreprocessor::new(false), false);

        let comment = fetcher.add_comment("PROJ-1", "", None).unwrap();

        assert!(fetcher.preprocessor.converted.read().unwrap().is_empty());
        assert_eq!(
            fetcher.api().requests_to("issue_add_comment")[0].payload,
            Some(json!({"body": ""}))
        );
        assert_eq!(comment.body, "");
    }

    #[test]
    fn test_failed_conversion_sends_original_text() {
        let fetcher = JiraFetcher::new(MockJiraApi::new(BASE), RecordingPreprocessor::new(true), false);

        fetcher.add_comment("PROJ-1", "| odd |", None).unwrap();

        assert_eq!(
            *fetcher.preprocessor.converted.read().unwrap(),
            vec!["| odd |".to_owned()]
        );
        assert_eq!(
            fetcher.api().requests_to("issue_add_comment")[0].payload,
            Some(json!({"body": "| odd |"}))
        );
    }

    #[test]
    fn test_add_comment_uses_converter() {
        let fetcher = JiraFetcher::new(MockJiraApi::new(BASE), RecordingPreprocessor::new(false), false);

        let comment = fetcher.add_comment("PROJ-1", "hello", None).unwrap();

        assert_eq!(comment.body, "converted: hello");
    }

    #[test]
    fn test_add_comment_non_object_response() {
        let fetcher = fetcher(
            MockJiraApi::new(BASE).with_comment_response(json!(["not", "an", "object"])),
            false,
        );

        let err = fetcher.add_comment("PROJ-1", "hi", None).unwrap_err();

        assert_eq!(
            err.to_string(),
            "Error adding comment: unexpected response: comment response is not a JSON object"
        );
    }

    #[test]
    fn test_add_comment_error() {
        let fetcher = fetcher(MockJiraApi::new(BASE).with_failure("issue_add_comment", 400), false);

        let err = fetcher.add_comment("PROJ-1", "hi", None).unwrap_err();

        assert!(err.to_string().starts_with("Error adding comment: HTTP error: 400"));
    }
}
